//! Rock-paper-scissors against the bot. No round state: every command is a
//! complete game.

use chatgames_types::minigame::{RpsChoice, RpsOutcome, RpsResult};
use rand::Rng;

/// Play one game. `reward` is reported on a win; crediting it is up to the
/// caller.
pub fn play<R: Rng + ?Sized>(raw: Option<&str>, reward: u64, rng: &mut R) -> RpsOutcome {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return RpsOutcome::Usage;
    };
    let player = match raw.parse::<RpsChoice>() {
        Ok(choice) => choice,
        Err(_) => {
            return RpsOutcome::InvalidChoice {
                raw: raw.to_string(),
            }
        }
    };

    let bot = RpsChoice::ALL[rng.gen_range(0..RpsChoice::ALL.len())];
    let result = player.against(bot);
    RpsOutcome::Played {
        player,
        bot,
        result,
        reward: if result == RpsResult::Win { reward } else { 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_usage_and_invalid_choice() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(play(None, 50, &mut rng), RpsOutcome::Usage);
        assert_eq!(play(Some("  "), 50, &mut rng), RpsOutcome::Usage);
        assert_eq!(
            play(Some("lizard"), 50, &mut rng),
            RpsOutcome::InvalidChoice {
                raw: "lizard".to_string()
            }
        );
    }

    #[test]
    fn test_reward_only_on_win() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            match play(Some("камень"), 50, &mut rng) {
                RpsOutcome::Played {
                    player,
                    bot,
                    result,
                    reward,
                } => {
                    assert_eq!(player, RpsChoice::Rock);
                    assert_eq!(result, player.against(bot));
                    assert_eq!(reward, if result == RpsResult::Win { 50 } else { 0 });
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
    }
}
