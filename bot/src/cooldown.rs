//! Per-user command cooldowns.

use chatgames_types::{ChannelId, UserId};
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Standing of a chat user in a channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Moderator,
    Broadcaster,
}

impl Role {
    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::Moderator | Role::Broadcaster)
    }
}

/// How cooldowns apply to a user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownEffect {
    Standard,
    Exempt,
}

impl CooldownEffect {
    /// The effect that applies to `role`.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Viewer => CooldownEffect::Standard,
            Role::Moderator | Role::Broadcaster => CooldownEffect::Exempt,
        }
    }
}

type Key = (ChannelId, UserId);

pub struct Cooldowns {
    limiter: RateLimiter<Key, DefaultKeyedStateStore<Key>, DefaultClock>,
}

impl Cooldowns {
    pub fn new(per_minute: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    /// Spend one command for the user. Returns false when they are cooling
    /// down.
    pub fn allow(&self, channel: &ChannelId, user: &UserId, role: Role) -> bool {
        match CooldownEffect::for_role(role) {
            CooldownEffect::Exempt => true,
            CooldownEffect::Standard => self
                .limiter
                .check_key(&(channel.clone(), user.clone()))
                .is_ok(),
        }
    }

    /// Drop state for users whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooldowns(per_minute: u32) -> Cooldowns {
        Cooldowns::new(NonZeroU32::new(per_minute).unwrap())
    }

    #[test]
    fn test_effect_for_role() {
        assert_eq!(CooldownEffect::for_role(Role::Viewer), CooldownEffect::Standard);
        assert_eq!(CooldownEffect::for_role(Role::Moderator), CooldownEffect::Exempt);
        assert_eq!(
            CooldownEffect::for_role(Role::Broadcaster),
            CooldownEffect::Exempt
        );
    }

    #[test]
    fn test_viewer_is_limited() {
        let cooldowns = cooldowns(2);
        let channel = ChannelId::from("chan");
        let user = UserId::from("alice");
        assert!(cooldowns.allow(&channel, &user, Role::Viewer));
        assert!(cooldowns.allow(&channel, &user, Role::Viewer));
        assert!(!cooldowns.allow(&channel, &user, Role::Viewer));
    }

    #[test]
    fn test_limits_are_per_user_and_channel() {
        let cooldowns = cooldowns(1);
        let alice = UserId::from("alice");
        assert!(cooldowns.allow(&ChannelId::from("one"), &alice, Role::Viewer));
        assert!(cooldowns.allow(&ChannelId::from("two"), &alice, Role::Viewer));
        assert!(cooldowns.allow(&ChannelId::from("one"), &UserId::from("bob"), Role::Viewer));
        assert!(!cooldowns.allow(&ChannelId::from("one"), &alice, Role::Viewer));
    }

    #[test]
    fn test_moderators_are_exempt() {
        let cooldowns = cooldowns(1);
        let channel = ChannelId::from("chan");
        let moderator = UserId::from("mod");
        for _ in 0..10 {
            assert!(cooldowns.allow(&channel, &moderator, Role::Moderator));
        }
        cooldowns.prune();
    }
}
