//! Shapes exchanged with the economy ledger and the chat log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ChannelId, RoundId, UserId};

/// Ledger category of a credit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    MinigameWin,
    RpsWin,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::MinigameWin => f.write_str("minigame_win"),
            TransactionType::RpsWin => f.write_str("rps_win"),
        }
    }
}

/// Idempotency key for a credit: one payout per (channel, round, winner).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreditKey {
    pub channel: ChannelId,
    pub round_id: RoundId,
    pub user: UserId,
}

/// A balance credit to deliver to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRequest {
    pub key: CreditKey,
    pub amount: u64,
    pub transaction_type: TransactionType,
    pub description: String,
}

impl CreditRequest {
    pub fn channel(&self) -> &ChannelId {
        &self.key.channel
    }

    pub fn user(&self) -> &UserId {
        &self.key.user
    }
}

/// Ledger view of a user's balance after a credit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDetail {
    pub channel: ChannelId,
    pub user: UserId,
    pub balance: u64,
    pub credited: u64,
}

/// How the payout of a win went
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PayoutStatus {
    Credited { balance: BalanceDetail },
    /// Delivery gave up; the round stays won. A retryable failure is queued
    /// and replayed later with the same key
    Failed {
        request: CreditRequest,
        reason: String,
        retryable: bool,
    },
}

/// One line of chat, from a user or from the bot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: ChannelId,
    pub user: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
