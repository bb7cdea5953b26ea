use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{GameKind, RoundState, MASK_PLACEHOLDER};
use crate::{ChannelId, RoundId, UserId};

/// Number-guess round state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberGuessRound {
    pub id: RoundId,
    pub channel: ChannelId,
    pub target: i64,
    pub min: i64,
    pub max: i64,
    pub prize: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub state: RoundState,
    /// Wrong in-range guesses so far
    pub attempts: u32,
}

impl NumberGuessRound {
    pub fn new(
        channel: ChannelId,
        target: i64,
        (min, max): (i64, i64),
        prize: u64,
        start_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            id: RoundId::random(),
            channel,
            target,
            min,
            max,
            prize,
            start_time,
            end_time: start_time + duration,
            state: RoundState::Active,
            attempts: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }

    pub fn winner(&self) -> Option<&UserId> {
        self.state.winner()
    }

    pub fn win_time(&self) -> Option<DateTime<Utc>> {
        self.state.win_time()
    }
}

/// Word-guess ("field of miracles") round state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGuessRound {
    pub id: RoundId,
    pub channel: ChannelId,
    /// Always lowercase
    pub target_word: String,
    pub hint: String,
    pub prize: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub state: RoundState,
    pub guessed_letters: BTreeSet<char>,
    /// Letter and word guesses that revealed nothing
    pub attempts: u32,
}

impl WordGuessRound {
    pub fn new(
        channel: ChannelId,
        word: &str,
        hint: impl Into<String>,
        prize: u64,
        start_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            id: RoundId::random(),
            channel,
            target_word: word.trim().to_lowercase(),
            hint: hint.into(),
            prize,
            start_time,
            end_time: start_time + duration,
            state: RoundState::Active,
            guessed_letters: BTreeSet::new(),
            attempts: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }

    pub fn winner(&self) -> Option<&UserId> {
        self.state.winner()
    }

    pub fn win_time(&self) -> Option<DateTime<Utc>> {
        self.state.win_time()
    }

    pub fn contains_letter(&self, letter: char) -> bool {
        self.target_word.chars().any(|c| c == letter)
    }

    /// True once every alphabetic character of the word has been guessed.
    pub fn is_fully_revealed(&self) -> bool {
        self.target_word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| self.guessed_letters.contains(&c))
    }

    /// Display form of the word: guessed letters and non-letters shown as-is,
    /// everything else replaced by a placeholder, separated by single spaces.
    pub fn masked_word(&self) -> String {
        let mut masked = String::with_capacity(self.target_word.len() * 2);
        for (i, c) in self.target_word.chars().enumerate() {
            if i > 0 {
                masked.push(' ');
            }
            if !c.is_alphabetic() || self.guessed_letters.contains(&c) {
                masked.push(c);
            } else {
                masked.push(MASK_PLACEHOLDER);
            }
        }
        masked
    }
}

/// A round of any kind, as held by the round store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Round {
    Number(NumberGuessRound),
    Word(WordGuessRound),
}

impl Round {
    pub fn kind(&self) -> GameKind {
        match self {
            Round::Number(_) => GameKind::NumberGuess,
            Round::Word(_) => GameKind::WordGuess,
        }
    }

    pub fn id(&self) -> RoundId {
        match self {
            Round::Number(r) => r.id,
            Round::Word(r) => r.id,
        }
    }

    pub fn channel(&self) -> &ChannelId {
        match self {
            Round::Number(r) => &r.channel,
            Round::Word(r) => &r.channel,
        }
    }

    pub fn state(&self) -> &RoundState {
        match self {
            Round::Number(r) => &r.state,
            Round::Word(r) => &r.state,
        }
    }

    pub fn prize(&self) -> u64 {
        match self {
            Round::Number(r) => r.prize,
            Round::Word(r) => r.prize,
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        match self {
            Round::Number(r) => r.end_time,
            Round::Word(r) => r.end_time,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Active and not yet past its end time.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now <= self.end_time()
    }

    /// The answer in display form (the number or the full word).
    pub fn answer(&self) -> String {
        match self {
            Round::Number(r) => r.target.to_string(),
            Round::Word(r) => r.target_word.clone(),
        }
    }
}

impl From<NumberGuessRound> for Round {
    fn from(round: NumberGuessRound) -> Self {
        Round::Number(round)
    }
}

impl From<WordGuessRound> for Round {
    fn from(round: WordGuessRound) -> Self {
        Round::Word(round)
    }
}
