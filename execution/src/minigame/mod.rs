//! Minigame round transitions.
//!
//! This module contains the guess logic for every chat minigame:
//! - Number guessing
//! - Word guessing ("field of miracles")
//! - Rock-paper-scissors (stateless)
//!
//! Transitions are pure: they take the current round, the guess and the time
//! it was observed, mutate the round in place and describe what happened.
//! Locking and persistence are the round store's job.

pub mod number;
pub mod rps;
pub mod word;

use chatgames_types::{
    minigame::{GuessKind, GuessOutcome, InputError, Round, RoundState, MAX_GUESS_LENGTH},
    UserId,
};
use chrono::{DateTime, Utc};

use crate::PrizeDecayPolicy;

/// Checks every guess goes through before it is looked at.
///
/// Expiry comes first: an active round past its end time is closed as timed
/// out even if the guess would have matched. A round that already ended
/// reports how it ended.
pub(crate) fn check_open(
    state: &mut RoundState,
    expired: bool,
    answer: &str,
) -> Option<GuessOutcome> {
    if state.is_active() && expired {
        *state = RoundState::TimedOut;
        return Some(GuessOutcome::TimedOut {
            answer: answer.to_string(),
        });
    }
    if !state.is_active() {
        return Some(GuessOutcome::AlreadyResolved {
            state: state.clone(),
            answer: answer.to_string(),
        });
    }
    None
}

/// Trim a raw guess and reject empty or oversized input.
pub(crate) fn normalize_input(raw: &str) -> Result<&str, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_GUESS_LENGTH {
        return Err(InputError::TooLong {
            len,
            max: MAX_GUESS_LENGTH,
        });
    }
    Ok(trimmed)
}

/// Dispatch a guess to the transition matching its kind.
///
/// Returns `None` when the round is not of the kind the guess targets.
pub fn apply_guess(
    round: &mut Round,
    kind: GuessKind,
    player: &UserId,
    raw: &str,
    now: DateTime<Utc>,
    policy: &PrizeDecayPolicy,
) -> Option<GuessOutcome> {
    match (kind, round) {
        (GuessKind::Number, Round::Number(round)) => Some(number::NumberGuess::evaluate(
            round, player, raw, now, policy,
        )),
        (GuessKind::Letter, Round::Word(round)) => Some(word::WordGuess::guess_letter(
            round, player, raw, now, policy,
        )),
        (GuessKind::Word, Round::Word(round)) => {
            Some(word::WordGuess::guess_word(round, player, raw, now))
        }
        _ => None,
    }
}

/// Administratively end a round. Returns false if it had already ended.
pub fn stop(round: &mut Round) -> bool {
    let state = match round {
        Round::Number(r) => &mut r.state,
        Round::Word(r) => &mut r.state,
    };
    if !state.is_active() {
        return false;
    }
    *state = RoundState::Stopped;
    true
}

/// Close an active round whose end time has passed. Returns true if it was
/// closed by this call.
pub fn expire(round: &mut Round, now: DateTime<Utc>) -> bool {
    if round.is_active() && now > round.end_time() {
        match round {
            Round::Number(r) => r.state = RoundState::TimedOut,
            Round::Word(r) => r.state = RoundState::TimedOut,
        }
        return true;
    }
    false
}
