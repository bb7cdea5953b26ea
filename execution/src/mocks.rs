//! Test doubles for the engine's collaborators.

use crate::{
    ports::{EconomyError, EconomyPort},
    Clock,
};
use async_trait::async_trait;
use chatgames_types::{
    ledger::{BalanceDetail, CreditKey, CreditRequest},
    ChannelId, UserId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock at a fixed, arbitrary instant.
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_default())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

#[derive(Default)]
struct LedgerInner {
    balances: HashMap<(ChannelId, UserId), u64>,
    applied: HashMap<CreditKey, BalanceDetail>,
    credits: Vec<CreditRequest>,
    attempts: usize,
    failures: Vec<EconomyError>,
}

/// Idempotent in-memory ledger that records every credit it applies and can
/// be told to fail.
#[derive(Default)]
pub struct RecordingLedger {
    inner: Mutex<LedgerInner>,
}

impl RecordingLedger {
    /// Fail the next `count` calls with `error`.
    pub fn fail_next(&self, count: usize, error: EconomyError) {
        let mut inner = lock(&self.inner);
        inner.failures.extend(std::iter::repeat(error).take(count));
    }

    /// Credits applied, in order. Replays of the same key appear once.
    pub fn credits(&self) -> Vec<CreditRequest> {
        lock(&self.inner).credits.clone()
    }

    /// Calls made, including failed ones and replays.
    pub fn attempts(&self) -> usize {
        lock(&self.inner).attempts
    }

    pub fn balance(&self, channel: &ChannelId, user: &UserId) -> u64 {
        lock(&self.inner)
            .balances
            .get(&(channel.clone(), user.clone()))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl EconomyPort for RecordingLedger {
    async fn add_balance(&self, request: &CreditRequest) -> Result<BalanceDetail, EconomyError> {
        let mut inner = lock(&self.inner);
        inner.attempts += 1;
        if !inner.failures.is_empty() {
            return Err(inner.failures.remove(0));
        }
        if let Some(detail) = inner.applied.get(&request.key) {
            return Ok(detail.clone());
        }

        let balance = inner
            .balances
            .entry((request.channel().clone(), request.user().clone()))
            .or_insert(0);
        *balance = balance.saturating_add(request.amount);
        let detail = BalanceDetail {
            channel: request.channel().clone(),
            user: request.user().clone(),
            balance: *balance,
            credited: request.amount,
        };
        inner.applied.insert(request.key.clone(), detail.clone());
        inner.credits.push(request.clone());
        Ok(detail)
    }
}
