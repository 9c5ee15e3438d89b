//! Authoritative state synchronization.
//!
//! ## Components
//!
//! - `document`: the persisted JSON document and its identifiers
//! - `store`: the compare-and-swap persistence boundary
//! - `acceptor`: read-validate-write transactions over a store
//! - `replica`: a polling client's view with optimistic local state
//! - `settlement`: the escrow-release hook invoked when a game finishes
//!
//! There is no lock held between read and write. Two racing proposals are
//! serialized by the store's version check, and the loser is re-validated
//! against the winner's state by the rule engine.

pub mod acceptor;
pub mod document;
pub mod error;
pub mod replica;
pub mod settlement;
pub mod store;

pub use acceptor::{Acceptor, Commit, Submission};
pub use document::{GameDocument, GameId, MatchStart, SeatId, Seats};
pub use error::{SyncError, SyncResult};
pub use replica::{PollEvent, Replica};
pub use settlement::{
    RecordingSettlement, SettlementError, SettlementHook, SettlementOutcome, SettlementRequest,
};
pub use store::{GameStore, MemoryStore, PutOutcome, PutRequest, RejectReason, StoreError, StoredRecord};
