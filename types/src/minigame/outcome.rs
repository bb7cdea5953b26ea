use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GameKind, GuessKind, Round, RoundState};
use crate::{ledger::PayoutStatus, ChannelId, RoundId, UserId};

/// A guess as received from a chat handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRequest {
    pub channel: ChannelId,
    pub user: UserId,
    pub kind: GuessKind,
    /// Raw argument text, if the command carried one
    pub input: Option<String>,
}

/// Direction hint after a wrong number guess
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hint {
    Higher,
    Lower,
}

/// Why a guess could not be interpreted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputError {
    NotANumber(String),
    NotALetter(String),
    Empty,
    TooLong { len: usize, max: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotANumber(raw) => write!(f, "not a number: {raw}"),
            InputError::NotALetter(raw) => write!(f, "not a single letter: {raw}"),
            InputError::Empty => write!(f, "empty guess"),
            InputError::TooLong { len, max } => {
                write!(f, "guess too long ({len} chars, max {max})")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// A round won by a guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    pub round_id: RoundId,
    pub channel: ChannelId,
    pub kind: GameKind,
    pub winner: UserId,
    pub prize: u64,
    pub answer: String,
}

/// Result of applying one guess. Every expected negative path is a variant
/// here rather than an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum GuessOutcome {
    /// The command carried no argument
    Usage { kind: GuessKind },
    NoActiveGame { kind: GameKind },
    InvalidInput { reason: InputError },
    OutOfRange { min: i64, max: i64 },
    /// Nothing revealed; number guesses carry a direction hint
    WrongGuess {
        hint: Option<Hint>,
        prize: u64,
        masked: Option<String>,
    },
    LetterRevealed {
        letter: char,
        masked: String,
        prize: u64,
    },
    /// The letter was guessed before
    NoNewInformation { letter: char, masked: String },
    /// This guess observed the round's expiry and closed it
    TimedOut { answer: String },
    /// The round had already ended before this guess
    AlreadyResolved { state: RoundState, answer: String },
    Won(Win),
}

impl GuessOutcome {
    pub fn win(&self) -> Option<&Win> {
        match self {
            GuessOutcome::Won(win) => Some(win),
            _ => None,
        }
    }
}

/// Engine reply to a guess: the outcome plus, for wins, how the payout went.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    pub outcome: GuessOutcome,
    pub payout: Option<PayoutStatus>,
}

impl GuessResponse {
    pub fn without_payout(outcome: GuessOutcome) -> Self {
        Self {
            outcome,
            payout: None,
        }
    }
}

/// Result of asking for a new round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StartOutcome {
    Started { round: Round },
    /// A live round already exists; it is returned unchanged
    AlreadyActive { round: Round },
}

/// Result of an administrative stop
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StopOutcome {
    Stopped { round: Round },
    AlreadyResolved { round: Round },
    NoActiveGame { kind: GameKind },
}
