//! In-memory round storage.
//!
//! Each (channel, kind) pair gets its own mutex-guarded slot. The outer map
//! lock is only held long enough to find or create a slot, so a guess in one
//! channel never waits on another channel. All mutation goes through
//! [RoundStore::with_active], which serializes guesses against the same round.

use chatgames_types::{
    minigame::{GameKind, Round},
    ChannelId,
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};
use thiserror::Error;
use tracing::error;

use crate::minigame;

type Slot = Arc<Mutex<Option<Round>>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no active {kind} game in {channel}")]
    NoActiveGame { channel: ChannelId, kind: GameKind },
    #[error("round store invariant violated for {channel}/{kind}: {detail}")]
    InvariantViolated {
        channel: ChannelId,
        kind: GameKind,
        detail: String,
    },
    #[error("round store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// True for errors that indicate a bug rather than an expected miss.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StoreError::NoActiveGame { .. })
    }
}

#[derive(Default)]
pub struct RoundStore {
    slots: RwLock<HashMap<(ChannelId, GameKind), Slot>>,
}

impl RoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, channel: &ChannelId, kind: GameKind) -> Result<Option<Slot>, StoreError> {
        let slots = self.slots.read().map_err(|e| {
            error!("Failed to acquire read lock on round slots: {}", e);
            StoreError::Poisoned
        })?;
        Ok(slots.get(&(channel.clone(), kind)).cloned())
    }

    fn find_or_create(&self, channel: &ChannelId, kind: GameKind) -> Result<Slot, StoreError> {
        if let Some(slot) = self.find(channel, kind)? {
            return Ok(slot);
        }
        let mut slots = self.slots.write().map_err(|e| {
            error!("Failed to acquire write lock on round slots: {}", e);
            StoreError::Poisoned
        })?;
        Ok(slots.entry((channel.clone(), kind)).or_default().clone())
    }

    fn lock(slot: &Slot) -> Result<MutexGuard<'_, Option<Round>>, StoreError> {
        slot.lock().map_err(|e| {
            error!("Failed to acquire round lock: {}", e);
            StoreError::Poisoned
        })
    }

    fn check_key(round: &Round, channel: &ChannelId, kind: GameKind) -> Result<(), StoreError> {
        if round.kind() != kind || round.channel() != channel {
            return Err(StoreError::InvariantViolated {
                channel: channel.clone(),
                kind,
                detail: format!(
                    "slot holds {} round {} for {}",
                    round.kind(),
                    round.id(),
                    round.channel()
                ),
            });
        }
        Ok(())
    }

    /// Store `round` unless a live round of the same kind already exists in its
    /// channel. A finished or expired round is replaced.
    ///
    /// Returns `Ok(false)` when a live round blocks the start.
    pub fn try_start(&self, round: Round, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let channel = round.channel().clone();
        let kind = round.kind();
        if !round.is_active() {
            return Err(StoreError::InvariantViolated {
                channel,
                kind,
                detail: format!("new round {} is not active", round.id()),
            });
        }

        let slot = self.find_or_create(&channel, kind)?;
        let mut current = Self::lock(&slot)?;
        if let Some(existing) = current.as_ref() {
            Self::check_key(existing, &channel, kind)?;
            if existing.is_live(now) {
                return Ok(false);
            }
        }
        *current = Some(round);
        Ok(true)
    }

    /// Snapshot of the channel's current round of `kind`. A round that has
    /// just finished stays visible until the next one starts or it is cleared.
    pub fn get_active(&self, channel: &ChannelId, kind: GameKind) -> Result<Round, StoreError> {
        let no_game = || StoreError::NoActiveGame {
            channel: channel.clone(),
            kind,
        };
        let slot = self.find(channel, kind)?.ok_or_else(no_game)?;
        let current = Self::lock(&slot)?;
        let round = current.as_ref().ok_or_else(no_game)?;
        Self::check_key(round, channel, kind)?;
        Ok(round.clone())
    }

    /// Run `f` against the current round while holding its lock and keep the
    /// modified round.
    ///
    /// `f` works on a copy that is committed only if it still belongs to the
    /// same (channel, kind) slot afterwards.
    pub fn with_active<T>(
        &self,
        channel: &ChannelId,
        kind: GameKind,
        f: impl FnOnce(&mut Round) -> T,
    ) -> Result<T, StoreError> {
        let no_game = || StoreError::NoActiveGame {
            channel: channel.clone(),
            kind,
        };
        let slot = self.find(channel, kind)?.ok_or_else(no_game)?;
        let mut current = Self::lock(&slot)?;
        let round = current.as_ref().ok_or_else(no_game)?;
        Self::check_key(round, channel, kind)?;

        let mut next = round.clone();
        let result = f(&mut next);
        Self::check_key(&next, channel, kind)?;
        *current = Some(next);
        Ok(result)
    }

    /// Remove the channel's round of `kind`, returning it.
    pub fn clear(&self, channel: &ChannelId, kind: GameKind) -> Result<Option<Round>, StoreError> {
        let Some(slot) = self.find(channel, kind)? else {
            return Ok(None);
        };
        // The slot stays in the map for the channel's next round
        let mut current = Self::lock(&slot)?;
        Ok(current.take())
    }

    /// Close every active round whose end time has passed. Returns the rounds
    /// this call closed.
    ///
    /// Guesses already close expired rounds on access; this only tidies up
    /// channels that went quiet.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<Round>, StoreError> {
        let slots: Vec<Slot> = {
            let slots = self.slots.read().map_err(|e| {
                error!("Failed to acquire read lock on round slots: {}", e);
                StoreError::Poisoned
            })?;
            slots.values().cloned().collect()
        };

        let mut swept = Vec::new();
        for slot in slots {
            let mut current = Self::lock(&slot)?;
            if let Some(round) = current.as_mut() {
                if minigame::expire(round, now) {
                    swept.push(round.clone());
                }
            }
        }
        Ok(swept)
    }
}
