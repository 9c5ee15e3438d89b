//! Chess with full move legality.
//!
//! ## Rules covered
//!
//! - Movement templates for all six piece types
//! - Self-check filtering: a move leaving the mover's king attacked is illegal
//! - Castling (rights flags plus `has_moved`, no castling out of, through or
//!   into check), en passant, promotion with an explicit piece choice
//! - Checkmate, stalemate, insufficient material, fifty-move rule
//!
//! Board orientation: row 0 is rank 8, so White moves "up" (decreasing row).

mod game;
pub mod movegen;
pub mod notation;
mod piece;
mod state;

pub use game::{Chess, FIFTY_MOVE_LIMIT};
pub use piece::{ChessPiece, Color, PieceKind};
pub use state::{CastleSide, CastlingRights, ChessLastMove, ChessMove, ChessState, SIZE};
