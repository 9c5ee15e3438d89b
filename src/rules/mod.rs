//! Rule engine trait for game implementations.
//!
//! Games implement `RuleEngine` to define:
//! - Legal destinations for a selected piece
//! - How a move modifies state
//! - Win/loss/draw conditions
//!
//! The timer and sync layers call into `RuleEngine` but never interpret
//! game-specific concepts directly. The three games share no rule code.

pub mod engine;

pub use engine::{ensure_turn, GameResult, Ply, RuleEngine, SideOf, TurnState, DRAW_MARKER};
