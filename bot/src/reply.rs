//! Reply text for engine results.

use chatgames_types::{
    ledger::PayoutStatus,
    minigame::{
        GameKind, GuessKind, GuessOutcome, GuessResponse, Hint, Round, RoundState, RpsOutcome,
        RpsResponse, RpsResult, StartOutcome, StopOutcome,
    },
    UserId,
};
use chrono::{DateTime, Utc};

fn usage(kind: GuessKind) -> &'static str {
    match kind {
        GuessKind::Number => "Usage: !guess <number>",
        GuessKind::Letter => "Usage: !letter <letter>",
        GuessKind::Word => "Usage: !solve <word>",
    }
}

fn start_command(kind: GameKind) -> &'static str {
    match kind {
        GameKind::NumberGuess => "!number",
        GameKind::WordGuess => "!word",
    }
}

pub fn no_active_game(kind: GameKind) -> String {
    format!(
        "No {kind} game is running. Start one with {}.",
        start_command(kind)
    )
}

fn payout_suffix(payout: &Option<PayoutStatus>) -> String {
    match payout {
        Some(PayoutStatus::Credited { balance }) => format!(" Balance: {}.", balance.balance),
        Some(PayoutStatus::Failed {
            retryable: true, ..
        }) => " The prize will be credited later.".to_string(),
        Some(PayoutStatus::Failed { .. }) => " The prize could not be credited.".to_string(),
        None => String::new(),
    }
}

pub fn guess(user: &UserId, response: &GuessResponse) -> String {
    match &response.outcome {
        GuessOutcome::Usage { kind } => usage(*kind).to_string(),
        GuessOutcome::NoActiveGame { kind } => no_active_game(*kind),
        GuessOutcome::InvalidInput { reason } => format!("@{user} {reason}."),
        GuessOutcome::OutOfRange { min, max } => {
            format!("@{user} pick a number from {min} to {max}.")
        }
        GuessOutcome::WrongGuess {
            hint: Some(hint),
            prize,
            ..
        } => {
            let direction = match hint {
                Hint::Higher => "higher",
                Hint::Lower => "lower",
            };
            format!("@{user} no, it is {direction}. Prize: {prize}.")
        }
        GuessOutcome::WrongGuess {
            hint: None,
            prize,
            masked,
        } => match masked {
            Some(masked) => format!("@{user} no luck. {masked} Prize: {prize}."),
            None => format!("@{user} no luck. Prize: {prize}."),
        },
        GuessOutcome::LetterRevealed {
            letter,
            masked,
            prize,
        } => format!("@{user} found '{letter}'! {masked} Prize: {prize}."),
        GuessOutcome::NoNewInformation { letter, masked } => {
            format!("'{letter}' is already open. {masked}")
        }
        GuessOutcome::TimedOut { answer } => format!("Time is up! The answer was {answer}."),
        GuessOutcome::AlreadyResolved { state, answer } => match state {
            RoundState::Won { winner, .. } => {
                format!("Too late, {winner} already won. The answer was {answer}.")
            }
            RoundState::TimedOut => format!("This round is over. The answer was {answer}."),
            RoundState::Stopped => "This round was stopped.".to_string(),
            RoundState::Active => "This round is still running.".to_string(),
        },
        GuessOutcome::Won(win) => format!(
            "@{} wins {}! The answer was {}.{}",
            win.winner,
            win.prize,
            win.answer,
            payout_suffix(&response.payout)
        ),
    }
}

fn describe(round: &Round) -> String {
    match round {
        Round::Number(r) => format!(
            "Guess a number from {} to {} with !guess. Prize: {}.",
            r.min, r.max, r.prize
        ),
        Round::Word(r) => format!(
            "{} {} Open letters with !letter or name the word with !solve. Prize: {}.",
            r.hint,
            r.masked_word(),
            r.prize
        ),
    }
}

pub fn start(outcome: &StartOutcome) -> String {
    match outcome {
        StartOutcome::Started { round } => {
            format!("New {} game! {}", round.kind(), describe(round))
        }
        StartOutcome::AlreadyActive { round } => format!(
            "A {} game is already running. {}",
            round.kind(),
            describe(round)
        ),
    }
}

pub fn status(kind: GameKind, round: Option<&Round>, now: DateTime<Utc>) -> String {
    let Some(round) = round else {
        return no_active_game(kind);
    };
    match round.state() {
        RoundState::Active if round.is_live(now) => {
            let left = (round.end_time() - now).num_seconds().max(0);
            format!("{} {left}s left.", describe(round))
        }
        RoundState::Active | RoundState::TimedOut => format!(
            "The last {kind} game ran out of time. The answer was {}.",
            round.answer()
        ),
        RoundState::Won { winner, .. } => format!(
            "The last {kind} game was won by {winner}. The answer was {}.",
            round.answer()
        ),
        RoundState::Stopped => format!("The last {kind} game was stopped."),
    }
}

pub fn stop(outcome: &StopOutcome) -> String {
    match outcome {
        StopOutcome::Stopped { round } => format!(
            "The {} game was stopped. The answer was {}.",
            round.kind(),
            round.answer()
        ),
        StopOutcome::AlreadyResolved { round } => {
            format!("The {} game has already ended.", round.kind())
        }
        StopOutcome::NoActiveGame { kind } => no_active_game(*kind),
    }
}

pub fn rps(user: &UserId, response: &RpsResponse) -> String {
    match &response.outcome {
        RpsOutcome::Usage => "Usage: !rps rock|paper|scissors".to_string(),
        RpsOutcome::InvalidChoice { raw } => {
            format!("@{user} '{raw}' is not rock, paper or scissors.")
        }
        RpsOutcome::Played {
            player,
            bot,
            result,
            reward,
        } => {
            let verdict = match result {
                RpsResult::Win if *reward > 0 => format!("You win {reward}!"),
                RpsResult::Win => "You win!".to_string(),
                RpsResult::Loss => "You lose.".to_string(),
                RpsResult::Draw => "Draw.".to_string(),
            };
            format!(
                "@{user} {player} vs {bot}. {verdict}{}",
                payout_suffix(&response.payout)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgames_types::{
        ledger::BalanceDetail,
        minigame::{NumberGuessRound, RpsChoice, Win, WordGuessRound},
        ChannelId, RoundId,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_win_reply_includes_balance() {
        let response = GuessResponse {
            outcome: GuessOutcome::Won(Win {
                round_id: RoundId::random(),
                channel: ChannelId::from("chan"),
                kind: GameKind::NumberGuess,
                winner: UserId::from("bob"),
                prize: 950,
                answer: "42".to_string(),
            }),
            payout: Some(PayoutStatus::Credited {
                balance: BalanceDetail {
                    channel: ChannelId::from("chan"),
                    user: UserId::from("bob"),
                    balance: 1_950,
                    credited: 950,
                },
            }),
        };
        assert_eq!(
            guess(&UserId::from("bob"), &response),
            "@bob wins 950! The answer was 42. Balance: 1950."
        );
    }

    #[test]
    fn test_hint_reply() {
        let response = GuessResponse::without_payout(GuessOutcome::WrongGuess {
            hint: Some(Hint::Lower),
            prize: 950,
            masked: None,
        });
        assert_eq!(
            guess(&UserId::from("alice"), &response),
            "@alice no, it is lower. Prize: 950."
        );
    }

    #[test]
    fn test_word_start_shows_mask_and_hint() {
        let round = WordGuessRound::new(
            ChannelId::from("chan"),
            "кот",
            "Мяукает",
            500,
            now(),
            Duration::minutes(5),
        );
        let reply = start(&StartOutcome::Started {
            round: round.into(),
        });
        assert!(reply.starts_with("New word game! Мяукает _ _ _"));
    }

    #[test]
    fn test_status_reports_time_left_and_results() {
        let mut round = NumberGuessRound::new(
            ChannelId::from("chan"),
            42,
            (1, 100),
            1_000,
            now(),
            Duration::minutes(5),
        );
        let reply = status(
            GameKind::NumberGuess,
            Some(&round.clone().into()),
            now() + Duration::minutes(1),
        );
        assert!(reply.ends_with("240s left."));

        let expired = status(
            GameKind::NumberGuess,
            Some(&round.clone().into()),
            now() + Duration::minutes(6),
        );
        assert!(expired.contains("ran out of time"));

        round.state = RoundState::Won {
            winner: UserId::from("bob"),
            at: now(),
        };
        let won = status(GameKind::NumberGuess, Some(&round.into()), now());
        assert!(won.contains("won by bob"));

        assert_eq!(
            status(GameKind::WordGuess, None, now()),
            "No word game is running. Start one with !word."
        );
    }

    #[test]
    fn test_rps_reply() {
        let response = RpsResponse {
            outcome: RpsOutcome::Played {
                player: RpsChoice::Rock,
                bot: RpsChoice::Paper,
                result: RpsResult::Loss,
                reward: 0,
            },
            payout: None,
        };
        assert_eq!(
            rps(&UserId::from("alice"), &response),
            "@alice rock vs paper. You lose."
        );
    }
}
