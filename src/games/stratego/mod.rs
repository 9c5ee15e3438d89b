//! Stratego on a 10×10 board with two central lakes.
//!
//! ## Phases
//!
//! - `setup`: both armies place their 40 pieces in their own four rows, in
//!   any order and without turn alternation, then declare ready
//! - `active`: red moves first; attacks reveal both pieces and resolve by rank
//!
//! Termination is only evaluated while active, so a half-placed army never
//! counts as having lost its flag.

mod game;
mod rank;
mod state;

pub use game::Stratego;
pub use rank::{resolve, Army, CombatResult, Rank, StrategoPiece};
pub use state::{
    in_setup_zone, is_lake, Combat, PerArmy, PiecePool, StrategoAction, StrategoLastMove,
    StrategoState, SIZE,
};
