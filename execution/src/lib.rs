pub mod engine;
pub mod minigame;
pub mod ports;
pub mod store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod clock;
mod decay;
mod payout;

pub use clock::{Clock, SystemClock};
pub use decay::PrizeDecayPolicy;
pub use engine::{EngineConfig, EngineError, MinigameEngine, NumberRules, WordEntry, WordRules};
pub use payout::Payout;
pub use store::{RoundStore, StoreError};
