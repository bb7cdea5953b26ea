mod constants;
mod game;
mod outcome;
mod round;
mod rps;

pub use constants::*;
pub use game::*;
pub use outcome::*;
pub use round::*;
pub use rps::*;
