use chatgames_execution::{EngineConfig, NumberRules, PrizeDecayPolicy, WordEntry, WordRules};
use chatgames_types::minigame::{
    DEFAULT_NUMBER_DECAY_STEP, DEFAULT_NUMBER_MAX, DEFAULT_NUMBER_MIN, DEFAULT_NUMBER_PRIZE,
    DEFAULT_ROUND_DURATION_SECS, DEFAULT_RPS_WIN_REWARD, DEFAULT_WORD_DECAY_STEP,
    DEFAULT_WORD_PRIZE, DEFAULT_WORD_PRIZE_FLOOR, NUMBER_PRIZE_FLOOR,
};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::Level;

/// Configuration for the bot, as read from YAML.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub settings_path: String,
    #[serde(default = "default_settings_ttl_secs")]
    pub settings_ttl_secs: u64,
    pub chat_log_path: String,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_credit_attempts")]
    pub credit_attempts: u32,
    #[serde(default = "default_credit_backoff_ms")]
    pub credit_backoff_ms: u64,

    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub number: NumberConfig,
    pub word: WordConfig,
    #[serde(default)]
    pub decay: DecayConfig,
    #[serde(default)]
    pub rps: RpsConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CooldownConfig {
    pub per_user_per_minute: u32,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            per_user_per_minute: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NumberConfig {
    pub min: i64,
    pub max: i64,
    pub initial_prize: u64,
    pub duration_secs: u64,
}

impl Default for NumberConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_NUMBER_MIN,
            max: DEFAULT_NUMBER_MAX,
            initial_prize: DEFAULT_NUMBER_PRIZE,
            duration_secs: DEFAULT_ROUND_DURATION_SECS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WordConfig {
    #[serde(default = "default_word_prize")]
    pub initial_prize: u64,
    #[serde(default = "default_round_duration_secs")]
    pub duration_secs: u64,
    pub words: Vec<WordEntryConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WordEntryConfig {
    pub word: String,
    pub hint: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DecayConfig {
    pub number_step: u64,
    pub word_step: u64,
    pub word_floor: u64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            number_step: DEFAULT_NUMBER_DECAY_STEP,
            word_step: DEFAULT_WORD_DECAY_STEP,
            word_floor: DEFAULT_WORD_PRIZE_FLOOR,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RpsConfig {
    pub win_reward: u64,
}

impl Default for RpsConfig {
    fn default() -> Self {
        Self {
            win_reward: DEFAULT_RPS_WIN_REWARD,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("number range is empty: min {min} must be below max {max}")]
    InvalidRange { min: i64, max: i64 },
    #[error("word dictionary is empty")]
    EmptyDictionary,
    #[error("dictionary word {word:?} has no letters")]
    InvalidWord { word: String },
    #[error("{field} floor {floor} is above the initial prize {prize}")]
    FloorAbovePrize {
        field: &'static str,
        floor: u64,
        prize: u64,
    },
}

pub struct ValidatedConfig {
    pub log_level: Level,
    pub settings_path: PathBuf,
    pub settings_ttl: Duration,
    pub chat_log_path: PathBuf,
    pub sweep_interval: Duration,
    pub cooldown_per_minute: NonZeroU32,
    pub engine: EngineConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_settings_ttl_secs() -> u64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    15
}

fn default_credit_attempts() -> u32 {
    3
}

fn default_credit_backoff_ms() -> u64 {
    200
}

fn default_word_prize() -> u64 {
    DEFAULT_WORD_PRIZE
}

fn default_round_duration_secs() -> u64 {
    DEFAULT_ROUND_DURATION_SECS
}

fn non_zero(field: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(value)
}

fn seconds(field: &'static str, value: u64) -> Result<chrono::Duration, ConfigError> {
    let secs = i64::try_from(non_zero(field, value)?)
        .map_err(|_| ConfigError::InvalidNonZero { field, value })?;
    Ok(chrono::Duration::seconds(secs))
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let cooldown_per_minute = NonZeroU32::new(self.cooldown.per_user_per_minute).ok_or(
            ConfigError::InvalidNonZero {
                field: "cooldown.per_user_per_minute",
                value: 0,
            },
        )?;
        let credit_attempts =
            non_zero("credit_attempts", self.credit_attempts as u64)? as u32;
        let sweep_interval = non_zero("sweep_interval_secs", self.sweep_interval_secs)?;

        if self.number.min >= self.number.max {
            return Err(ConfigError::InvalidRange {
                min: self.number.min,
                max: self.number.max,
            });
        }
        if self.number.initial_prize < NUMBER_PRIZE_FLOOR {
            return Err(ConfigError::FloorAbovePrize {
                field: "number",
                floor: NUMBER_PRIZE_FLOOR,
                prize: self.number.initial_prize,
            });
        }
        let number = NumberRules {
            min: self.number.min,
            max: self.number.max,
            initial_prize: self.number.initial_prize,
            duration: seconds("number.duration_secs", self.number.duration_secs)?,
        };

        if self.word.words.is_empty() {
            return Err(ConfigError::EmptyDictionary);
        }
        let mut words = Vec::with_capacity(self.word.words.len());
        for entry in self.word.words {
            let word = entry.word.trim().to_lowercase();
            if !word.chars().any(char::is_alphabetic) {
                return Err(ConfigError::InvalidWord { word: entry.word });
            }
            words.push(WordEntry {
                word,
                hint: entry.hint,
            });
        }
        if self.decay.word_floor > self.word.initial_prize {
            return Err(ConfigError::FloorAbovePrize {
                field: "word",
                floor: self.decay.word_floor,
                prize: self.word.initial_prize,
            });
        }
        let word = WordRules {
            initial_prize: self.word.initial_prize,
            duration: seconds("word.duration_secs", self.word.duration_secs)?,
            words,
        };

        Ok(ValidatedConfig {
            log_level,
            settings_path: PathBuf::from(self.settings_path),
            settings_ttl: Duration::from_secs(self.settings_ttl_secs),
            chat_log_path: PathBuf::from(self.chat_log_path),
            sweep_interval: Duration::from_secs(sweep_interval),
            cooldown_per_minute,
            engine: EngineConfig {
                number,
                word,
                decay: PrizeDecayPolicy {
                    number_step: self.decay.number_step,
                    word_step: self.decay.word_step,
                    word_floor: self.decay.word_floor,
                },
                rps_win_reward: self.rps.win_reward,
                credit_attempts,
                credit_backoff: Duration::from_millis(self.credit_backoff_ms),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
settings_path: /tmp/settings.json
chat_log_path: /tmp/chat.jsonl
word:
  words:
    - word: " Ракета "
      hint: "Летит в космос"
"#;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = parse(MINIMAL).validate().unwrap();
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.settings_ttl, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(15));
        assert_eq!(config.cooldown_per_minute.get(), 10);
        assert_eq!(config.engine.number.min, DEFAULT_NUMBER_MIN);
        assert_eq!(config.engine.number.max, DEFAULT_NUMBER_MAX);
        assert_eq!(
            config.engine.number.duration,
            chrono::Duration::seconds(DEFAULT_ROUND_DURATION_SECS as i64)
        );
        assert_eq!(config.engine.decay, PrizeDecayPolicy::default());
        assert_eq!(config.engine.credit_attempts, 3);
        assert_eq!(config.engine.word.words[0].word, "ракета");
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
log_level: debug
settings_path: settings.json
settings_ttl_secs: 5
chat_log_path: chat.jsonl
sweep_interval_secs: 3
credit_attempts: 5
credit_backoff_ms: 10
cooldown:
  per_user_per_minute: 2
number:
  min: 10
  max: 20
  initial_prize: 700
  duration_secs: 60
word:
  initial_prize: 900
  duration_secs: 120
  words:
    - word: кот
      hint: мяукает
decay:
  number_step: 25
  word_step: 75
  word_floor: 150
rps:
  win_reward: 0
"#;
        let config = parse(yaml).validate().unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.cooldown_per_minute.get(), 2);
        assert_eq!(config.engine.number.initial_prize, 700);
        assert_eq!(config.engine.word.duration, chrono::Duration::seconds(120));
        assert_eq!(config.engine.decay.word_floor, 150);
        assert_eq!(config.engine.rps_win_reward, 0);
        assert_eq!(config.engine.credit_backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = parse(MINIMAL);
        config.log_level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));

        let mut config = parse(MINIMAL);
        config.number.min = 50;
        config.number.max = 50;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { min: 50, max: 50 })
        ));

        let mut config = parse(MINIMAL);
        config.word.words.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyDictionary)
        ));

        let mut config = parse(MINIMAL);
        config.word.words[0].word = "123".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWord { .. })
        ));

        let mut config = parse(MINIMAL);
        config.credit_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero {
                field: "credit_attempts",
                ..
            })
        ));

        let mut config = parse(MINIMAL);
        config.number.duration_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero {
                field: "number.duration_secs",
                ..
            })
        ));

        let mut config = parse(MINIMAL);
        config.decay.word_floor = config.word.initial_prize + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FloorAbovePrize { field: "word", .. })
        ));

        let mut config = parse(MINIMAL);
        config.number.initial_prize = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FloorAbovePrize {
                field: "number",
                floor: NUMBER_PRIZE_FLOOR,
                prize: 100,
            })
        ));

        let mut config = parse(MINIMAL);
        config.number.initial_prize = NUMBER_PRIZE_FLOOR;
        assert!(config.validate().is_ok());
    }
}
