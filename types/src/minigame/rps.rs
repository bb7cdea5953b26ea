use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::ledger::PayoutStatus;

/// Rock-paper-scissors throw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    pub const ALL: [RpsChoice; 3] = [RpsChoice::Rock, RpsChoice::Paper, RpsChoice::Scissors];

    /// The throw this one defeats.
    pub fn beats(&self) -> RpsChoice {
        match self {
            RpsChoice::Rock => RpsChoice::Scissors,
            RpsChoice::Paper => RpsChoice::Rock,
            RpsChoice::Scissors => RpsChoice::Paper,
        }
    }

    pub fn against(&self, other: RpsChoice) -> RpsResult {
        if *self == other {
            RpsResult::Draw
        } else if self.beats() == other {
            RpsResult::Win
        } else {
            RpsResult::Loss
        }
    }
}

impl fmt::Display for RpsChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RpsChoice::Rock => "rock",
            RpsChoice::Paper => "paper",
            RpsChoice::Scissors => "scissors",
        };
        f.write_str(name)
    }
}

impl FromStr for RpsChoice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rock" | "r" | "камень" | "к" => Ok(RpsChoice::Rock),
            "paper" | "p" | "бумага" | "б" => Ok(RpsChoice::Paper),
            "scissors" | "s" | "ножницы" | "н" => Ok(RpsChoice::Scissors),
            other => Err(UnknownChoice(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownChoice(pub String);

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not rock, paper or scissors: {}", self.0)
    }
}

impl std::error::Error for UnknownChoice {}

/// Result from the player's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpsResult {
    Win,
    Loss,
    Draw,
}

/// One rock-paper-scissors game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RpsOutcome {
    Usage,
    InvalidChoice { raw: String },
    Played {
        player: RpsChoice,
        bot: RpsChoice,
        result: RpsResult,
        reward: u64,
    },
}

/// Engine reply to a rock-paper-scissors command
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpsResponse {
    pub outcome: RpsOutcome,
    pub payout: Option<PayoutStatus>,
}
