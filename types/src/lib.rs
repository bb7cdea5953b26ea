//! Shared types for chat minigames.
//!
//! Everything here is plain data: identities, round values, guess outcomes and
//! the request/response shapes exchanged with the economy and chat-log
//! collaborators. State transitions live in `chatgames-execution`.

mod identity;
pub mod ledger;
pub mod minigame;

pub use identity::{ChannelId, RoundId, UserId};
