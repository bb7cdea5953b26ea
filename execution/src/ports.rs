//! Collaborators outside the minigame core.

use async_trait::async_trait;
use chatgames_types::ledger::{BalanceDetail, ChatMessage, CreditRequest};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EconomyError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("credit rejected: {0}")]
    Rejected(String),
}

impl EconomyError {
    /// Whether delivering the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EconomyError::Unavailable(_))
    }
}

/// Balance ledger credited when a player wins.
///
/// Implementations must be idempotent on [CreditRequest::key]: a request
/// delivered more than once credits the balance once and returns the same
/// detail.
#[async_trait]
pub trait EconomyPort: Send + Sync {
    async fn add_balance(&self, request: &CreditRequest) -> Result<BalanceDetail, EconomyError>;
}

#[derive(Debug, Error)]
pub enum ChatLogError {
    #[error("chat log io: {0}")]
    Io(#[from] std::io::Error),
    #[error("chat log encode: {0}")]
    Encode(String),
}

/// Persistent record of chat lines. Chat handlers save the user's command and
/// the bot's reply; the engine never calls it.
#[async_trait]
pub trait ChatLogPort: Send + Sync {
    async fn save_chat_message(&self, message: &ChatMessage) -> Result<(), ChatLogError>;
}
