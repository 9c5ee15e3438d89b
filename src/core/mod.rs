//! Core engine types: squares, boards, sides, status, RNG, configuration.
//!
//! This module contains the game-agnostic building blocks. Each game in
//! `games` brings its own piece type and rules on top of these.

pub mod square;
pub mod board;
pub mod side;
pub mod status;
pub mod rng;
pub mod config;
pub mod error;

pub use square::{Square, SquareSet};
pub use board::Board;
pub use side::Side;
pub use status::GameStatus;
pub use rng::GameRng;
pub use config::{GameKind, PollConfig, SyncConfig, TimerConfig};
pub use error::{RuleError, RuleResult};
