use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::UserId;

/// Minigames that keep a round per channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    NumberGuess,
    WordGuess,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::NumberGuess, GameKind::WordGuess];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::NumberGuess => "number",
            GameKind::WordGuess => "word",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = UnknownGameKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "number" | "num" | "числа" | "число" => Ok(GameKind::NumberGuess),
            "word" | "слово" => Ok(GameKind::WordGuess),
            other => Err(UnknownGameKind(other.to_string())),
        }
    }
}

/// Returned when a game name in a command is not recognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownGameKind(pub String);

impl fmt::Display for UnknownGameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown game: {}", self.0)
    }
}

impl std::error::Error for UnknownGameKind {}

/// What a guess is aimed at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessKind {
    Number,
    Letter,
    Word,
}

impl GuessKind {
    pub fn game(&self) -> GameKind {
        match self {
            GuessKind::Number => GameKind::NumberGuess,
            GuessKind::Letter | GuessKind::Word => GameKind::WordGuess,
        }
    }
}

/// Lifecycle of a round.
///
/// `Active` is the only non-terminal state. A winner and win time exist only
/// in `Won`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RoundState {
    Active,
    Won { winner: UserId, at: DateTime<Utc> },
    TimedOut,
    Stopped,
}

impl RoundState {
    pub fn is_active(&self) -> bool {
        matches!(self, RoundState::Active)
    }

    pub fn winner(&self) -> Option<&UserId> {
        match self {
            RoundState::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }

    pub fn win_time(&self) -> Option<DateTime<Utc>> {
        match self {
            RoundState::Won { at, .. } => Some(*at),
            _ => None,
        }
    }
}
