//! Checkers (American draughts) on an 8×8 board.
//!
//! - Black starts on rows 0–2 and moves first; white starts on rows 5–7
//! - Men step and jump diagonally forward; kings in all four directions
//! - Captures are optional, but once a piece has captured and can capture
//!   again, the turn stays with that piece until the chain ends
//! - A man reaching the far row is crowned, which ends the turn
//! - A side with no pieces, or no legal move on its turn, loses

mod game;
mod piece;

pub use game::{Checkers, CheckersLastMove, CheckersMove, CheckersState, SIZE};
pub use piece::{CheckersPiece, Color, PieceKind};
