//! Game lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a game document.
///
/// `waiting → setup → active → finished`. Games without a placement phase
/// go straight from `waiting` to `active`. `finished` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Waiting,
    Setup,
    Active,
    Finished,
}

impl GameStatus {
    /// Check if moves may be played.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, GameStatus::Active)
    }

    /// Check if the game is over.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, GameStatus::Finished)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Setup => "setup",
            GameStatus::Active => "active",
            GameStatus::Finished => "finished",
        })
    }
}
