//! Chat line handling.
//!
//! Turns one chat line into at most one reply: parse the command, check the
//! channel's settings and the user's cooldown, run it against the engine and
//! render the result. Every command that gets a reply is written to the chat
//! log together with that reply.

use chatgames_execution::{ports::ChatLogPort, Clock, MinigameEngine};
use chatgames_types::{
    ledger::ChatMessage,
    minigame::GuessRequest,
    ChannelId, UserId,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::{
    commands::Command,
    cooldown::{Cooldowns, Role},
    reply,
    settings::{ChannelSettings, SettingsStore},
};

/// One line of chat
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLine {
    pub channel: ChannelId,
    pub user: UserId,
    pub role: Role,
    pub text: String,
}

impl ChatLine {
    /// Parse a console line of the form `channel user [mod] message`.
    pub fn from_console(line: &str) -> Option<ChatLine> {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        let channel = parts.next().filter(|s| !s.is_empty())?;
        let user = parts.next().filter(|s| !s.is_empty())?;
        let rest = parts.next().unwrap_or("").trim_start();
        let (role, text) = match rest.split_once(char::is_whitespace) {
            Some(("mod", text)) => (Role::Moderator, text.trim()),
            _ if rest == "mod" => (Role::Moderator, ""),
            _ => (Role::Viewer, rest.trim()),
        };
        Some(ChatLine {
            channel: ChannelId::from(channel),
            user: UserId::from(user),
            role,
            text: text.to_string(),
        })
    }
}

const GENERIC_FAILURE: &str = "Something went wrong, try again later.";

pub struct ChatHandler {
    engine: Arc<MinigameEngine>,
    settings: Arc<SettingsStore>,
    cooldowns: Cooldowns,
    chat_log: Arc<dyn ChatLogPort>,
    clock: Arc<dyn Clock>,
    bot: UserId,
}

impl ChatHandler {
    pub fn new(
        engine: Arc<MinigameEngine>,
        settings: Arc<SettingsStore>,
        cooldowns: Cooldowns,
        chat_log: Arc<dyn ChatLogPort>,
        clock: Arc<dyn Clock>,
        bot: UserId,
    ) -> Self {
        Self {
            engine,
            settings,
            cooldowns,
            chat_log,
            clock,
            bot,
        }
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    /// Handle one chat line. Returns the reply, or `None` for ordinary chat.
    pub async fn handle(&self, line: &ChatLine) -> Option<String> {
        let command = Command::parse(&line.text)?;
        debug!(channel = %line.channel, user = %line.user, ?command, "command received");

        let reply = self.respond(line, command).await;
        self.log(&line.channel, &line.user, &line.text).await;
        self.log(&line.channel, &self.bot, &reply).await;
        Some(reply)
    }

    async fn log(&self, channel: &ChannelId, user: &UserId, content: &str) {
        let message = ChatMessage {
            channel: channel.clone(),
            user: user.clone(),
            content: content.to_string(),
            timestamp: self.clock.now(),
        };
        if let Err(e) = self.chat_log.save_chat_message(&message).await {
            warn!(%channel, %user, error = %e, "failed to save chat message");
        }
    }

    async fn channel_settings(&self, channel: &ChannelId) -> ChannelSettings {
        match self.settings.get(channel).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(%channel, error = %e, "failed to load channel settings, using defaults");
                ChannelSettings::default()
            }
        }
    }

    async fn respond(&self, line: &ChatLine, command: Command) -> String {
        if command.is_privileged() && !line.role.is_moderator() {
            return format!("@{} only moderators can do that.", line.user);
        }

        let settings = self.channel_settings(&line.channel).await;
        if !settings.minigames_enabled && !command.is_toggle() {
            return "Minigames are turned off in this channel.".to_string();
        }
        if matches!(command, Command::Rps { .. }) && !settings.rps_enabled {
            return "Rock-paper-scissors is turned off in this channel.".to_string();
        }
        if !self.cooldowns.allow(&line.channel, &line.user, line.role) {
            debug!(channel = %line.channel, user = %line.user, "command on cooldown");
            return format!("@{} slow down a little.", line.user);
        }

        let result = match command {
            Command::StartNumber => self
                .engine
                .start_number_round(&line.channel)
                .map(|outcome| reply::start(&outcome)),
            Command::StartWord => self
                .engine
                .start_word_round(&line.channel)
                .map(|outcome| reply::start(&outcome)),
            Command::Guess { kind, input } => {
                let request = GuessRequest {
                    channel: line.channel.clone(),
                    user: line.user.clone(),
                    kind,
                    input,
                };
                self.engine
                    .handle_guess(request)
                    .await
                    .map(|response| reply::guess(&line.user, &response))
            }
            Command::Status { kind: Some(kind) } => self
                .engine
                .status(&line.channel, kind)
                .map(|round| reply::status(kind, round.as_ref(), self.clock.now())),
            Command::Stop { kind: Some(kind) } => self
                .engine
                .stop_round(&line.channel, kind)
                .map(|outcome| reply::stop(&outcome)),
            Command::Status { kind: None } => Ok("Usage: !status number|word".to_string()),
            Command::Stop { kind: None } => Ok("Usage: !stop number|word".to_string()),
            Command::Rps { choice } => {
                let response = self
                    .engine
                    .play_rps(&line.channel, &line.user, choice.as_deref())
                    .await;
                Ok(reply::rps(&line.user, &response))
            }
            Command::SetMinigames { enabled } => Ok(self
                .set_switch(
                    &line.channel,
                    enabled,
                    "!minigames on|off",
                    "Minigames",
                    |s, on| s.minigames_enabled = on,
                )
                .await),
            Command::SetRps { enabled } => Ok(self
                .set_switch(
                    &line.channel,
                    enabled,
                    "!minigames rps on|off",
                    "Rock-paper-scissors",
                    |s, on| s.rps_enabled = on,
                )
                .await),
        };
        result.unwrap_or_else(|e| {
            error!(channel = %line.channel, user = %line.user, error = %e, "command failed");
            GENERIC_FAILURE.to_string()
        })
    }

    async fn set_switch(
        &self,
        channel: &ChannelId,
        enabled: Option<bool>,
        usage: &str,
        name: &str,
        apply: impl FnOnce(&mut ChannelSettings, bool) + Send,
    ) -> String {
        let Some(enabled) = enabled else {
            return format!("Usage: {usage}");
        };
        match self
            .settings
            .update(channel, |s| apply(s, enabled))
            .await
        {
            Ok(_) if enabled => format!("{name} turned on."),
            Ok(_) => format!("{name} turned off."),
            Err(e) => {
                error!(%channel, error = %e, "failed to update channel settings");
                GENERIC_FAILURE.to_string()
            }
        }
    }

    /// Retry payouts the ledger could not take earlier.
    pub async fn replay_credits(&self) -> usize {
        let pending = self.engine.pending_credits();
        if pending == 0 {
            return 0;
        }
        let credited = self.engine.replay_credits().await;
        debug!(pending, credited, "replayed pending credits");
        credited
    }

    /// Close rounds that ran out of time and announce them.
    pub fn sweep(&self) -> Vec<(ChannelId, String)> {
        match self.engine.sweep_expired() {
            Ok(rounds) => rounds
                .into_iter()
                .map(|round| {
                    let text = format!(
                        "Nobody guessed the {} game in time. The answer was {}.",
                        round.kind(),
                        round.answer()
                    );
                    (round.channel().clone(), text)
                })
                .collect(),
            Err(e) => {
                error!(error = %e, "sweep failed");
                Vec::new()
            }
        }
    }
}
