//! Word guessing ("field of miracles").
//!
//! Players reveal letters one at a time with `!letter <c>` or try the whole
//! word with `!solve <word>`. Each revealed letter costs the prize a decay
//! step; revealing the last hidden letter wins the round for whoever guessed
//! it. A correct full-word guess wins at the current prize.

use super::{check_open, normalize_input};
use crate::PrizeDecayPolicy;
use chatgames_types::{
    minigame::{GameKind, GuessOutcome, InputError, RoundState, Win, WordGuessRound},
    UserId,
};
use chrono::{DateTime, Utc};

pub struct WordGuess;

impl WordGuess {
    /// A letter guess must be exactly one alphabetic character. Returned in
    /// lowercase.
    pub fn validate_letter(raw: &str) -> Result<char, InputError> {
        let trimmed = normalize_input(raw)?;
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => Ok(c.to_lowercase().next().unwrap_or(c)),
            _ => Err(InputError::NotALetter(trimmed.to_string())),
        }
    }

    /// Apply a single-letter guess.
    pub fn guess_letter(
        round: &mut WordGuessRound,
        player: &UserId,
        raw: &str,
        now: DateTime<Utc>,
        policy: &PrizeDecayPolicy,
    ) -> GuessOutcome {
        let expired = round.is_expired(now);
        if let Some(closed) = check_open(&mut round.state, expired, &round.target_word) {
            return closed;
        }

        let letter = match Self::validate_letter(raw) {
            Ok(letter) => letter,
            Err(reason) => return GuessOutcome::InvalidInput { reason },
        };

        if round.guessed_letters.contains(&letter) {
            return GuessOutcome::NoNewInformation {
                letter,
                masked: round.masked_word(),
            };
        }

        if !round.contains_letter(letter) {
            round.attempts = round.attempts.saturating_add(1);
            return GuessOutcome::WrongGuess {
                hint: None,
                prize: round.prize,
                masked: Some(round.masked_word()),
            };
        }

        round.guessed_letters.insert(letter);
        round.prize = policy.decay_word(round.prize);

        if round.is_fully_revealed() {
            return Self::win(round, player, now);
        }

        GuessOutcome::LetterRevealed {
            letter,
            masked: round.masked_word(),
            prize: round.prize,
        }
    }

    /// Apply a full-word guess. No decay either way.
    pub fn guess_word(
        round: &mut WordGuessRound,
        player: &UserId,
        raw: &str,
        now: DateTime<Utc>,
    ) -> GuessOutcome {
        let expired = round.is_expired(now);
        if let Some(closed) = check_open(&mut round.state, expired, &round.target_word) {
            return closed;
        }

        let guess = match normalize_input(raw) {
            Ok(guess) => guess.to_lowercase(),
            Err(reason) => return GuessOutcome::InvalidInput { reason },
        };

        if guess == round.target_word {
            return Self::win(round, player, now);
        }

        round.attempts = round.attempts.saturating_add(1);
        GuessOutcome::WrongGuess {
            hint: None,
            prize: round.prize,
            masked: Some(round.masked_word()),
        }
    }

    fn win(round: &mut WordGuessRound, player: &UserId, now: DateTime<Utc>) -> GuessOutcome {
        round.state = RoundState::Won {
            winner: player.clone(),
            at: now,
        };
        GuessOutcome::Won(Win {
            round_id: round.id,
            channel: round.channel.clone(),
            kind: GameKind::WordGuess,
            winner: player.clone(),
            prize: round.prize,
            answer: round.target_word.clone(),
        })
    }
}
