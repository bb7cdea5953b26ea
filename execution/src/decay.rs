//! Prize decay.
//!
//! Both games shrink the prize as guesses accumulate. Decay is a pure function
//! of the current prize: it never increases it and stops at the game's floor.

use chatgames_types::minigame::{
    DEFAULT_NUMBER_DECAY_STEP, DEFAULT_WORD_DECAY_STEP, DEFAULT_WORD_PRIZE_FLOOR,
    NUMBER_PRIZE_FLOOR,
};

/// Step sizes and floors for prize decay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrizeDecayPolicy {
    pub number_step: u64,
    pub word_step: u64,
    pub word_floor: u64,
}

impl Default for PrizeDecayPolicy {
    fn default() -> Self {
        Self {
            number_step: DEFAULT_NUMBER_DECAY_STEP,
            word_step: DEFAULT_WORD_DECAY_STEP,
            word_floor: DEFAULT_WORD_PRIZE_FLOOR,
        }
    }
}

impl PrizeDecayPolicy {
    /// Prize after a wrong number guess. Only decays while above the floor.
    pub fn decay_number(&self, current: u64) -> u64 {
        decay_to_floor(current, self.number_step, NUMBER_PRIZE_FLOOR)
    }

    /// Prize after a revealed letter.
    pub fn decay_word(&self, current: u64) -> u64 {
        decay_to_floor(current, self.word_step, self.word_floor)
    }
}

fn decay_to_floor(current: u64, step: u64, floor: u64) -> u64 {
    if current <= floor {
        // A prize configured below the floor is left as-is
        return current;
    }
    current.saturating_sub(step).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_decay_steps_down() {
        let policy = PrizeDecayPolicy {
            number_step: 100,
            ..Default::default()
        };
        assert_eq!(policy.decay_number(1_000), 900);
        assert_eq!(policy.decay_number(350), NUMBER_PRIZE_FLOOR);
    }

    #[test]
    fn test_number_decay_idempotent_at_floor() {
        let policy = PrizeDecayPolicy::default();
        assert_eq!(policy.decay_number(NUMBER_PRIZE_FLOOR), NUMBER_PRIZE_FLOOR);
        assert_eq!(
            policy.decay_number(policy.decay_number(NUMBER_PRIZE_FLOOR)),
            NUMBER_PRIZE_FLOOR
        );
    }

    #[test]
    fn test_decay_never_raises_low_prize() {
        let policy = PrizeDecayPolicy::default();
        assert_eq!(policy.decay_number(200), 200);
        assert_eq!(policy.decay_word(10), 10);
    }

    #[test]
    fn test_word_decay_uses_configured_floor() {
        let policy = PrizeDecayPolicy {
            number_step: 50,
            word_step: 75,
            word_floor: 400,
        };
        assert_eq!(policy.decay_word(1_000), 925);
        assert_eq!(policy.decay_word(450), 400);
        assert_eq!(policy.decay_word(400), 400);
    }

    #[test]
    fn test_decay_sequence_is_monotonic() {
        let policy = PrizeDecayPolicy {
            number_step: 37,
            word_step: 41,
            word_floor: 123,
        };
        let mut number = 1_000;
        let mut word = 1_000;
        for _ in 0..100 {
            let next_number = policy.decay_number(number);
            let next_word = policy.decay_word(word);
            assert!(next_number <= number && next_number >= NUMBER_PRIZE_FLOOR);
            assert!(next_word <= word && next_word >= 123);
            number = next_number;
            word = next_word;
        }
        assert_eq!(number, NUMBER_PRIZE_FLOOR);
        assert_eq!(word, 123);
    }
}
