use async_trait::async_trait;
use chatgames_execution::ports::{EconomyError, EconomyPort};
use chatgames_types::{
    ledger::{BalanceDetail, CreditKey, CreditRequest},
    ChannelId, UserId,
};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use tracing::{debug, error};

#[derive(Default)]
struct Balances {
    balances: HashMap<(ChannelId, UserId), u64>,
    applied: HashMap<CreditKey, BalanceDetail>,
}

/// In-process balance ledger.
///
/// Credits are idempotent on their key: replaying a request returns the
/// detail recorded the first time without crediting again.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<Balances>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, channel: &ChannelId, user: &UserId) -> Option<u64> {
        let state = match self.state.read() {
            Ok(state) => state,
            Err(e) => {
                error!("Failed to acquire read lock on balances: {}", e);
                return None;
            }
        };
        Some(
            state
                .balances
                .get(&(channel.clone(), user.clone()))
                .copied()
                .unwrap_or(0),
        )
    }
}

#[async_trait]
impl EconomyPort for MemoryLedger {
    async fn add_balance(&self, request: &CreditRequest) -> Result<BalanceDetail, EconomyError> {
        let mut state = self.state.write().map_err(|e| {
            error!("Failed to acquire write lock on balances: {}", e);
            EconomyError::Unavailable("balance store poisoned".to_string())
        })?;
        if let Some(detail) = state.applied.get(&request.key) {
            debug!(round = %request.key.round_id, user = %request.user(), "credit already applied");
            return Ok(detail.clone());
        }

        let balance = state
            .balances
            .entry((request.channel().clone(), request.user().clone()))
            .or_insert(0);
        *balance = balance
            .checked_add(request.amount)
            .ok_or_else(|| EconomyError::Rejected("balance overflow".to_string()))?;
        let detail = BalanceDetail {
            channel: request.channel().clone(),
            user: request.user().clone(),
            balance: *balance,
            credited: request.amount,
        };
        state.applied.insert(request.key.clone(), detail.clone());
        debug!(
            channel = %detail.channel,
            user = %detail.user,
            kind = %request.transaction_type,
            amount = request.amount,
            "balance credited"
        );
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgames_types::{ledger::TransactionType, RoundId};

    fn request(user: &str, amount: u64) -> CreditRequest {
        CreditRequest {
            key: CreditKey {
                channel: ChannelId::from("chan"),
                round_id: RoundId::random(),
                user: UserId::from(user),
            },
            amount,
            transaction_type: TransactionType::MinigameWin,
            description: "win".to_string(),
        }
    }

    #[tokio::test]
    async fn test_credits_accumulate() {
        let ledger = MemoryLedger::new();
        ledger.add_balance(&request("alice", 100)).await.unwrap();
        let detail = ledger.add_balance(&request("alice", 50)).await.unwrap();
        assert_eq!(detail.balance, 150);
        assert_eq!(detail.credited, 50);
        assert_eq!(
            ledger.balance(&ChannelId::from("chan"), &UserId::from("alice")),
            Some(150)
        );
        assert_eq!(
            ledger.balance(&ChannelId::from("chan"), &UserId::from("bob")),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_replay_is_idempotent() {
        let ledger = MemoryLedger::new();
        let request = request("alice", 100);
        let first = ledger.add_balance(&request).await.unwrap();
        let second = ledger.add_balance(&request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            ledger.balance(&ChannelId::from("chan"), &UserId::from("alice")),
            Some(100)
        );
    }

    #[tokio::test]
    async fn test_overflow_is_rejected() {
        let ledger = MemoryLedger::new();
        ledger.add_balance(&request("alice", u64::MAX)).await.unwrap();
        let err = ledger.add_balance(&request("alice", 1)).await.unwrap_err();
        assert!(!err.is_retryable());
    }
}
