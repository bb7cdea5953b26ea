/// Number-guess prize never decays below this amount
pub const NUMBER_PRIZE_FLOOR: u64 = 300;

/// Prize reduction per wrong number guess
pub const DEFAULT_NUMBER_DECAY_STEP: u64 = 50;

/// Prize reduction per revealed letter
pub const DEFAULT_WORD_DECAY_STEP: u64 = 50;

/// Lowest prize a word round can decay to
pub const DEFAULT_WORD_PRIZE_FLOOR: u64 = 100;

/// Starting prize for a number round
pub const DEFAULT_NUMBER_PRIZE: u64 = 1_000;

/// Starting prize for a word round
pub const DEFAULT_WORD_PRIZE: u64 = 1_000;

/// Default guessing range for number rounds
pub const DEFAULT_NUMBER_MIN: i64 = 1;
pub const DEFAULT_NUMBER_MAX: i64 = 100;

/// Round lifetime in seconds (5 minutes)
pub const DEFAULT_ROUND_DURATION_SECS: u64 = 5 * 60;

/// Reward for beating the bot at rock-paper-scissors
pub const DEFAULT_RPS_WIN_REWARD: u64 = 50;

/// Placeholder for unrevealed letters in a masked word
pub const MASK_PLACEHOLDER: char = '_';

/// Longest guess text accepted from chat
pub const MAX_GUESS_LENGTH: usize = 64;
