//! # stakeboard
//!
//! Rule engines and authoritative state synchronization for two-player,
//! wagered board games: Checkers, Chess and Stratego.
//!
//! ## Design Principles
//!
//! 1. **Independent engines**: each game is its own module implementing the
//!    `RuleEngine` capability. No rule code is shared between games.
//!
//! 2. **One source of truth**: a versioned JSON `GameDocument` held by a
//!    `GameStore`. Clients hold read replicas; every mutation is re-validated
//!    against a fresh read before it is written.
//!
//! 3. **Games never stall**: a per-ply deadline lets any client trigger a
//!    forced random move (or automatic Stratego setup). Resolution is
//!    idempotent.
//!
//! ## Modules
//!
//! - `core`: squares, boards, sides, status, RNG, configuration, rule errors
//! - `rules`: the `RuleEngine` / `TurnState` traits and `GameResult`
//! - `games`: `checkers`, `chess`, `stratego`
//! - `timer`: clocks, deadlines and expiry resolution
//! - `sync`: documents, store, acceptor, replica, settlement hook

pub mod core;
pub mod games;
pub mod rules;
pub mod sync;
pub mod timer;

// Re-export commonly used types
pub use crate::core::{
    Board, GameKind, GameRng, GameStatus, PollConfig, RuleError, RuleResult, Side, Square,
    SquareSet, SyncConfig, TimerConfig,
};

pub use crate::rules::{GameResult, Ply, RuleEngine, TurnState};

pub use crate::games::checkers::Checkers;
pub use crate::games::chess::Chess;
pub use crate::games::stratego::Stratego;

pub use crate::timer::{resolve_expiry, Clock, Expiry, ManualClock, SystemClock, TurnTimer};

pub use crate::sync::{
    Acceptor, Commit, GameDocument, GameId, GameStore, MatchStart, MemoryStore, Replica, SeatId,
    Seats, SettlementHook, Submission, SyncError,
};
