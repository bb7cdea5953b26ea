use chatgames_types::ledger::{CreditKey, CreditRequest, PayoutStatus};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{error, info, warn};

use crate::ports::EconomyPort;

/// Delivers credits to the ledger at least once.
///
/// Each attempt reuses the request's key, so an idempotent ledger credits a
/// win exactly once no matter how many attempts it took. Giving up never
/// reopens the round. A request that failed with a retryable error is kept
/// in a pending queue until [Payout::replay_pending] gets it through.
#[derive(Clone)]
pub struct Payout {
    economy: Arc<dyn EconomyPort>,
    attempts: u32,
    backoff: Duration,
    pending: Arc<Mutex<BTreeMap<CreditKey, CreditRequest>>>,
}

impl Payout {
    pub fn new(economy: Arc<dyn EconomyPort>, attempts: u32, backoff: Duration) -> Self {
        Self {
            economy,
            attempts: attempts.max(1),
            backoff,
            pending: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn pending(&self) -> MutexGuard<'_, BTreeMap<CreditKey, CreditRequest>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of credits waiting to be replayed.
    pub fn pending_len(&self) -> usize {
        self.pending().len()
    }

    pub async fn deliver(&self, request: CreditRequest) -> PayoutStatus {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.economy.add_balance(&request).await {
                Ok(balance) => {
                    info!(
                        channel = %request.channel(),
                        user = %request.user(),
                        round = %request.key.round_id,
                        amount = request.amount,
                        balance = balance.balance,
                        "credited winner"
                    );
                    return PayoutStatus::Credited { balance };
                }
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    warn!(
                        channel = %request.channel(),
                        round = %request.key.round_id,
                        attempt,
                        error = %e,
                        "ledger credit failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    error!(
                        channel = %request.channel(),
                        user = %request.user(),
                        round = %request.key.round_id,
                        amount = request.amount,
                        attempt,
                        retryable,
                        error = %e,
                        "ledger credit failed, giving up"
                    );
                    if retryable {
                        self.pending()
                            .insert(request.key.clone(), request.clone());
                    }
                    return PayoutStatus::Failed {
                        request,
                        reason: e.to_string(),
                        retryable,
                    };
                }
            }
        }
    }

    /// Try every pending credit once. Returns how many went through.
    ///
    /// Credits that fail again with a retryable error stay queued; any other
    /// failure drops them.
    pub async fn replay_pending(&self) -> usize {
        let queued: Vec<CreditRequest> = self.pending().values().cloned().collect();
        let mut credited = 0;
        for request in queued {
            match self.economy.add_balance(&request).await {
                Ok(balance) => {
                    info!(
                        channel = %request.channel(),
                        user = %request.user(),
                        round = %request.key.round_id,
                        amount = request.amount,
                        balance = balance.balance,
                        "replayed credit"
                    );
                    self.pending().remove(&request.key);
                    credited += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        channel = %request.channel(),
                        round = %request.key.round_id,
                        error = %e,
                        "replayed credit failed, keeping it queued"
                    );
                }
                Err(e) => {
                    error!(
                        channel = %request.channel(),
                        user = %request.user(),
                        round = %request.key.round_id,
                        amount = request.amount,
                        error = %e,
                        "replayed credit rejected, dropping it"
                    );
                    self.pending().remove(&request.key);
                }
            }
        }
        credited
    }
}
