//! Rule engine errors.
//!
//! Every variant is recoverable: the caller re-reads the authoritative state
//! and tries again. A rejected transition never touches the stored document.

use thiserror::Error;

use super::square::Square;
use super::status::GameStatus;

/// Result type alias for rule engine operations.
pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// Why a proposed transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("not this side's turn")]
    NotYourTurn,

    #[error("illegal move {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("no movable piece of the acting side on {0}")]
    NoPiece(Square),

    #[error("game is finished")]
    GameFinished,

    #[error("game is not active (status: {0})")]
    NotActive(GameStatus),

    #[error("game is not in setup")]
    NotInSetup,

    #[error("invalid promotion choice")]
    InvalidPromotion,

    #[error("invalid placement on {0}")]
    InvalidPlacement(Square),

    #[error("no pieces of that rank left to place")]
    PoolExhausted,

    #[error("setup is incomplete")]
    SetupIncomplete,

    #[error("side is already marked ready")]
    AlreadyReady,
}

impl RuleError {
    /// Check if the rejection is a turn-order violation rather than a bad move.
    #[must_use]
    pub const fn is_out_of_turn(&self) -> bool {
        matches!(self, RuleError::NotYourTurn | RuleError::GameFinished)
    }
}
