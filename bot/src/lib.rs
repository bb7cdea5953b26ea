pub mod chatlog;
pub mod commands;
pub mod config;
pub mod cooldown;
pub mod handler;
pub mod ledger;
pub mod reply;
pub mod settings;

pub use chatlog::JsonlChatLog;
pub use config::{Config, ConfigError, ValidatedConfig};
pub use cooldown::{CooldownEffect, Cooldowns, Role};
pub use handler::{ChatHandler, ChatLine};
pub use ledger::MemoryLedger;
pub use settings::{ChannelSettings, SettingsError, SettingsStore};
