//! Minigame engine.
//!
//! The entry point chat handlers call. A guess is looked up, applied to the
//! round under the round's lock, and the result handed back as an outcome
//! value. Winners are credited after the lock is released.

use chatgames_types::{
    ledger::{CreditKey, CreditRequest, TransactionType},
    minigame::{
        GameKind, GuessOutcome, GuessRequest, GuessResponse, NumberGuessRound, Round, RpsOutcome,
        RpsResponse, StartOutcome, StopOutcome, Win, WordGuessRound, DEFAULT_NUMBER_MAX,
        DEFAULT_NUMBER_MIN, DEFAULT_NUMBER_PRIZE, DEFAULT_ROUND_DURATION_SECS,
        DEFAULT_RPS_WIN_REWARD, DEFAULT_WORD_PRIZE,
    },
    ChannelId, RoundId, UserId,
};
use chrono::Duration;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::{
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    minigame::{self, rps},
    ports::EconomyPort,
    store::{RoundStore, StoreError},
    Clock, Payout, PrizeDecayPolicy,
};

/// Rules for number rounds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberRules {
    pub min: i64,
    pub max: i64,
    pub initial_prize: u64,
    pub duration: Duration,
}

/// A dictionary word with the hint shown when the round starts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub hint: String,
}

/// Rules for word rounds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordRules {
    pub initial_prize: u64,
    pub duration: Duration,
    pub words: Vec<WordEntry>,
}

/// Configuration for the [MinigameEngine].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub number: NumberRules,
    pub word: WordRules,
    pub decay: PrizeDecayPolicy,
    pub rps_win_reward: u64,
    pub credit_attempts: u32,
    pub credit_backoff: StdDuration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let duration = Duration::seconds(DEFAULT_ROUND_DURATION_SECS as i64);
        Self {
            number: NumberRules {
                min: DEFAULT_NUMBER_MIN,
                max: DEFAULT_NUMBER_MAX,
                initial_prize: DEFAULT_NUMBER_PRIZE,
                duration,
            },
            word: WordRules {
                initial_prize: DEFAULT_WORD_PRIZE,
                duration,
                words: vec![
                    WordEntry {
                        word: "ракета".to_string(),
                        hint: "Летит в космос".to_string(),
                    },
                    WordEntry {
                        word: "библиотека".to_string(),
                        hint: "Здесь живут книги".to_string(),
                    },
                ],
            },
            decay: PrizeDecayPolicy::default(),
            rps_win_reward: DEFAULT_RPS_WIN_REWARD,
            credit_attempts: 3,
            credit_backoff: StdDuration::from_millis(200),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("round store failure: {0}")]
    Store(#[from] StoreError),
    #[error("word dictionary is empty")]
    EmptyDictionary,
    #[error("number range is empty: [{min}, {max}]")]
    EmptyRange { min: i64, max: i64 },
}

pub struct MinigameEngine {
    config: EngineConfig,
    store: Arc<RoundStore>,
    clock: Arc<dyn Clock>,
    payout: Payout,
    rng: Mutex<StdRng>,
}

impl MinigameEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<RoundStore>,
        clock: Arc<dyn Clock>,
        economy: Arc<dyn EconomyPort>,
    ) -> Self {
        Self::with_rng(config, store, clock, economy, StdRng::from_entropy())
    }

    /// Construct with a caller-supplied RNG (deterministic targets in tests).
    pub fn with_rng(
        config: EngineConfig,
        store: Arc<RoundStore>,
        clock: Arc<dyn Clock>,
        economy: Arc<dyn EconomyPort>,
        rng: StdRng,
    ) -> Self {
        let payout = Payout::new(economy, config.credit_attempts, config.credit_backoff);
        Self {
            config,
            store,
            clock,
            payout,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn sample<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    fn fatal(&self, err: StoreError) -> EngineError {
        error!(error = %err, "round store failure");
        EngineError::Store(err)
    }

    /// Apply a guess and, if it won, credit the winner.
    pub async fn handle_guess(&self, request: GuessRequest) -> Result<GuessResponse, EngineError> {
        let kind = request.kind.game();
        let Some(raw) = request
            .input
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
        else {
            return Ok(GuessResponse::without_payout(GuessOutcome::Usage {
                kind: request.kind,
            }));
        };

        // Look up the round
        match self.store.get_active(&request.channel, kind) {
            Ok(_) => {}
            Err(StoreError::NoActiveGame { .. }) => {
                return Ok(GuessResponse::without_payout(GuessOutcome::NoActiveGame {
                    kind,
                }));
            }
            Err(e) => return Err(self.fatal(e)),
        }

        // Transition under the round's lock; time is read inside so expiry is
        // judged at the moment the guess is applied
        let policy = self.config.decay;
        let applied = self.store.with_active(&request.channel, kind, |round| {
            let now = self.clock.now();
            minigame::apply_guess(round, request.kind, &request.user, raw, now, &policy)
        });
        let outcome = match applied {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                return Err(self.fatal(StoreError::InvariantViolated {
                    channel: request.channel.clone(),
                    kind,
                    detail: format!("round cannot take {:?} guesses", request.kind),
                }));
            }
            // Cleared between lookup and lock
            Err(StoreError::NoActiveGame { .. }) => GuessOutcome::NoActiveGame { kind },
            Err(e) => return Err(self.fatal(e)),
        };

        match &outcome {
            GuessOutcome::Won(win) => info!(
                channel = %win.channel,
                kind = %win.kind,
                round = %win.round_id,
                user = %win.winner,
                prize = win.prize,
                "round won"
            ),
            GuessOutcome::TimedOut { .. } => info!(
                channel = %request.channel,
                %kind,
                user = %request.user,
                "round timed out"
            ),
            other => debug!(
                channel = %request.channel,
                %kind,
                user = %request.user,
                outcome = ?other,
                "guess applied"
            ),
        }

        // Credit outside the lock; the round is already won
        let payout = match &outcome {
            GuessOutcome::Won(win) => Some(self.payout.deliver(Self::win_credit(win)).await),
            _ => None,
        };
        Ok(GuessResponse { outcome, payout })
    }

    fn win_credit(win: &Win) -> CreditRequest {
        CreditRequest {
            key: CreditKey {
                channel: win.channel.clone(),
                round_id: win.round_id,
                user: win.winner.clone(),
            },
            amount: win.prize,
            transaction_type: TransactionType::MinigameWin,
            description: format!("{} game won with \"{}\"", win.kind, win.answer),
        }
    }

    /// Store a round built elsewhere (an external scheduler or admin command).
    pub fn start_round(&self, round: Round) -> Result<StartOutcome, EngineError> {
        let now = self.clock.now();
        let channel = round.channel().clone();
        let kind = round.kind();
        if self
            .store
            .try_start(round.clone(), now)
            .map_err(|e| self.fatal(e))?
        {
            info!(
                %channel,
                %kind,
                round = %round.id(),
                prize = round.prize(),
                ends = %round.end_time(),
                "round started"
            );
            return Ok(StartOutcome::Started { round });
        }

        let existing = self
            .store
            .get_active(&channel, kind)
            .map_err(|e| self.fatal(e))?;
        debug!(%channel, %kind, round = %existing.id(), "round already active");
        Ok(StartOutcome::AlreadyActive { round: existing })
    }

    /// Start a number round with a random target from the configured range.
    pub fn start_number_round(&self, channel: &ChannelId) -> Result<StartOutcome, EngineError> {
        let rules = &self.config.number;
        if rules.min > rules.max {
            return Err(EngineError::EmptyRange {
                min: rules.min,
                max: rules.max,
            });
        }
        let target = self.sample(|rng| rng.gen_range(rules.min..=rules.max));
        let round = NumberGuessRound::new(
            channel.clone(),
            target,
            (rules.min, rules.max),
            rules.initial_prize,
            self.clock.now(),
            rules.duration,
        );
        self.start_round(round.into())
    }

    /// Start a word round with a random dictionary entry.
    pub fn start_word_round(&self, channel: &ChannelId) -> Result<StartOutcome, EngineError> {
        let rules = &self.config.word;
        let entry = self
            .sample(|rng| rules.words.choose(rng).cloned())
            .ok_or(EngineError::EmptyDictionary)?;
        let round = WordGuessRound::new(
            channel.clone(),
            &entry.word,
            entry.hint,
            rules.initial_prize,
            self.clock.now(),
            rules.duration,
        );
        self.start_round(round.into())
    }

    /// End the channel's round without a winner.
    pub fn stop_round(
        &self,
        channel: &ChannelId,
        kind: GameKind,
    ) -> Result<StopOutcome, EngineError> {
        let stopped = self.store.with_active(channel, kind, |round| {
            let stopped = minigame::stop(round);
            (stopped, round.clone())
        });
        match stopped {
            Ok((true, round)) => {
                info!(%channel, %kind, round = %round.id(), "round stopped");
                Ok(StopOutcome::Stopped { round })
            }
            Ok((false, round)) => Ok(StopOutcome::AlreadyResolved { round }),
            Err(StoreError::NoActiveGame { .. }) => Ok(StopOutcome::NoActiveGame { kind }),
            Err(e) => Err(self.fatal(e)),
        }
    }

    /// The channel's current (or just finished) round of `kind`.
    pub fn status(&self, channel: &ChannelId, kind: GameKind) -> Result<Option<Round>, EngineError> {
        match self.store.get_active(channel, kind) {
            Ok(round) => Ok(Some(round)),
            Err(StoreError::NoActiveGame { .. }) => Ok(None),
            Err(e) => Err(self.fatal(e)),
        }
    }

    /// Close expired rounds nobody guessed in.
    pub fn sweep_expired(&self) -> Result<Vec<Round>, EngineError> {
        let swept = self
            .store
            .sweep_expired(self.clock.now())
            .map_err(|e| self.fatal(e))?;
        for round in &swept {
            info!(
                channel = %round.channel(),
                kind = %round.kind(),
                round = %round.id(),
                "swept expired round"
            );
        }
        Ok(swept)
    }

    /// Replay credits whose delivery failed with a retryable error.
    pub async fn replay_credits(&self) -> usize {
        self.payout.replay_pending().await
    }

    /// Credits waiting to be replayed.
    pub fn pending_credits(&self) -> usize {
        self.payout.pending_len()
    }

    /// Play rock-paper-scissors and credit a win.
    pub async fn play_rps(
        &self,
        channel: &ChannelId,
        user: &UserId,
        raw: Option<&str>,
    ) -> RpsResponse {
        let reward = self.config.rps_win_reward;
        let outcome = self.sample(|rng| rps::play(raw, reward, rng));
        let payout = match &outcome {
            RpsOutcome::Played { reward, .. } if *reward > 0 => {
                let request = CreditRequest {
                    key: CreditKey {
                        channel: channel.clone(),
                        round_id: RoundId::random(),
                        user: user.clone(),
                    },
                    amount: *reward,
                    transaction_type: TransactionType::RpsWin,
                    description: "rock-paper-scissors win".to_string(),
                };
                Some(self.payout.deliver(request).await)
            }
            _ => None,
        };
        debug!(%channel, %user, outcome = ?outcome, "rps played");
        RpsResponse { outcome, payout }
    }
}
