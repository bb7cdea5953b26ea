//! Number guessing.
//!
//! The bot picks a target in `[min, max]`; players guess with `!guess <n>`.
//! A wrong guess answers with a higher/lower hint and costs the prize one
//! decay step until it reaches the floor.

use super::{check_open, normalize_input};
use crate::PrizeDecayPolicy;
use chatgames_types::{
    minigame::{GameKind, GuessOutcome, Hint, InputError, NumberGuessRound, RoundState, Win},
    UserId,
};
use chrono::{DateTime, Utc};

pub struct NumberGuess;

impl NumberGuess {
    /// Parse a raw guess as an integer.
    pub fn validate_guess(raw: &str) -> Result<i64, InputError> {
        let trimmed = normalize_input(raw)?;
        trimmed
            .parse::<i64>()
            .map_err(|_| InputError::NotANumber(trimmed.to_string()))
    }

    /// Apply one guess to the round.
    pub fn evaluate(
        round: &mut NumberGuessRound,
        player: &UserId,
        raw: &str,
        now: DateTime<Utc>,
        policy: &PrizeDecayPolicy,
    ) -> GuessOutcome {
        let expired = round.is_expired(now);
        if let Some(closed) = check_open(&mut round.state, expired, &round.target.to_string()) {
            return closed;
        }

        let guess = match Self::validate_guess(raw) {
            Ok(guess) => guess,
            Err(reason) => return GuessOutcome::InvalidInput { reason },
        };

        if guess < round.min || guess > round.max {
            return GuessOutcome::OutOfRange {
                min: round.min,
                max: round.max,
            };
        }

        if guess == round.target {
            round.state = RoundState::Won {
                winner: player.clone(),
                at: now,
            };
            return GuessOutcome::Won(Win {
                round_id: round.id,
                channel: round.channel.clone(),
                kind: GameKind::NumberGuess,
                winner: player.clone(),
                prize: round.prize,
                answer: round.target.to_string(),
            });
        }

        round.attempts = round.attempts.saturating_add(1);
        round.prize = policy.decay_number(round.prize);
        let hint = if guess < round.target {
            Hint::Higher
        } else {
            Hint::Lower
        };
        GuessOutcome::WrongGuess {
            hint: Some(hint),
            prize: round.prize,
            masked: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgames_types::{minigame::NUMBER_PRIZE_FLOOR, ChannelId};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn create_round(target: i64, prize: u64) -> NumberGuessRound {
        NumberGuessRound::new(
            ChannelId::from("chan"),
            target,
            (1, 100),
            prize,
            start(),
            Duration::minutes(5),
        )
    }

    fn policy() -> PrizeDecayPolicy {
        PrizeDecayPolicy {
            number_step: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_guess() {
        assert_eq!(NumberGuess::validate_guess(" 17 "), Ok(17));
        assert_eq!(NumberGuess::validate_guess("-3"), Ok(-3));
        assert_eq!(
            NumberGuess::validate_guess("seven"),
            Err(InputError::NotANumber("seven".to_string()))
        );
        assert_eq!(NumberGuess::validate_guess(""), Err(InputError::Empty));
    }

    #[test]
    fn test_wrong_guess_hints_and_decays() {
        let mut round = create_round(42, 1_000);
        let alice = UserId::from("alice");
        let now = start() + Duration::seconds(10);

        let outcome = NumberGuess::evaluate(&mut round, &alice, "50", now, &policy());
        assert_eq!(
            outcome,
            GuessOutcome::WrongGuess {
                hint: Some(Hint::Lower),
                prize: 900,
                masked: None,
            }
        );

        let outcome = NumberGuess::evaluate(&mut round, &alice, "10", now, &policy());
        assert!(matches!(
            outcome,
            GuessOutcome::WrongGuess {
                hint: Some(Hint::Higher),
                prize: 800,
                ..
            }
        ));
        assert_eq!(round.attempts, 2);
        assert!(round.is_active());
    }

    #[test]
    fn test_correct_guess_wins_at_current_prize() {
        let mut round = create_round(42, 1_000);
        let alice = UserId::from("alice");
        let now = start() + Duration::seconds(30);

        NumberGuess::evaluate(&mut round, &alice, "50", now, &policy());
        let outcome = NumberGuess::evaluate(&mut round, &alice, "42", now, &policy());

        let win = outcome.win().expect("expected a win");
        assert_eq!(win.prize, 900);
        assert_eq!(win.winner, alice);
        assert_eq!(round.prize, 900);
        assert_eq!(round.winner(), Some(&alice));
        assert_eq!(round.win_time(), Some(now));
    }

    #[test]
    fn test_out_of_range_leaves_round_unchanged() {
        let mut round = create_round(42, 1_000);
        let before = round.clone();
        let outcome = NumberGuess::evaluate(
            &mut round,
            &UserId::from("bob"),
            "101",
            start(),
            &policy(),
        );
        assert_eq!(outcome, GuessOutcome::OutOfRange { min: 1, max: 100 });
        assert_eq!(round, before);
    }

    #[test]
    fn test_invalid_input_leaves_round_unchanged() {
        let mut round = create_round(42, 1_000);
        let before = round.clone();
        let outcome =
            NumberGuess::evaluate(&mut round, &UserId::from("bob"), "4x2", start(), &policy());
        assert!(matches!(outcome, GuessOutcome::InvalidInput { .. }));
        assert_eq!(round, before);
    }

    #[test]
    fn test_expired_round_times_out_even_on_target() {
        let mut round = create_round(42, 1_000);
        let late = round.end_time + Duration::seconds(1);

        let outcome = NumberGuess::evaluate(&mut round, &UserId::from("bob"), "42", late, &policy());
        assert_eq!(
            outcome,
            GuessOutcome::TimedOut {
                answer: "42".to_string()
            }
        );
        assert_eq!(round.state, RoundState::TimedOut);
        assert_eq!(round.prize, 1_000);

        let outcome = NumberGuess::evaluate(&mut round, &UserId::from("bob"), "42", late, &policy());
        assert!(matches!(
            outcome,
            GuessOutcome::AlreadyResolved {
                state: RoundState::TimedOut,
                ..
            }
        ));
    }

    #[test]
    fn test_guess_after_win_is_rejected() {
        let mut round = create_round(42, 1_000);
        let now = start();
        NumberGuess::evaluate(&mut round, &UserId::from("alice"), "42", now, &policy());
        let outcome = NumberGuess::evaluate(&mut round, &UserId::from("bob"), "42", now, &policy());
        assert!(matches!(outcome, GuessOutcome::AlreadyResolved { .. }));
        assert_eq!(round.winner(), Some(&UserId::from("alice")));
    }

    #[test]
    fn test_decay_stops_at_floor() {
        let mut round = create_round(42, 450);
        let alice = UserId::from("alice");
        for _ in 0..5 {
            NumberGuess::evaluate(&mut round, &alice, "1", start(), &policy());
        }
        assert_eq!(round.prize, NUMBER_PRIZE_FLOOR);
        assert_eq!(round.attempts, 5);
    }
}
