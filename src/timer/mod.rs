//! Turn timer: per-ply deadlines and the forced-move fallback.
//!
//! ## Overview
//!
//! Every ply has a wall-clock deadline measured from the document's
//! `turnStartedAt`. When it passes, any client may ask the acceptor to
//! resolve the expiry:
//!
//! - `active`: a uniformly random legal move is played for the side to move
//! - `setup`: each side that is not ready has its remaining pieces placed
//!   at random and is marked ready
//!
//! Resolution is a pure function of the state and a seeded `GameRng`, so it
//! can be re-derived inside the acceptor's read-validate-write transaction.

pub mod clock;
pub mod turn;

pub use clock::{Clock, ManualClock, SystemClock};
pub use turn::{resolve_expiry, Expiry, TurnTimer};
