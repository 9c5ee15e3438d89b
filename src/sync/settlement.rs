//! Settlement hook: the boundary to the escrow subsystem.
//!
//! The acceptor reports each finished game exactly once, after the write
//! that finished it. Failures never reopen the game; they are kept in a
//! retry ledger on the acceptor.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::document::{GameId, SeatId};

/// Who gets paid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettlementOutcome {
    Winner(SeatId),
    Draw,
}

/// Emitted once per finished game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
    pub game_id: GameId,
    pub outcome: SettlementOutcome,
    pub stake: Option<u64>,
}

/// Escrow release failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("settlement failed: {0}")]
pub struct SettlementError(pub String);

/// External escrow-release collaborator.
pub trait SettlementHook: Send + Sync {
    fn release(&self, request: &SettlementRequest) -> Result<(), SettlementError>;
}

/// Records every release; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingSettlement {
    released: Mutex<Vec<SettlementRequest>>,
    failing: Mutex<u32>,
}

impl RecordingSettlement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` releases.
    pub fn fail_next(&self, count: u32) {
        *self.failing.lock() = count;
    }

    /// Successful releases so far.
    #[must_use]
    pub fn released(&self) -> Vec<SettlementRequest> {
        self.released.lock().clone()
    }
}

impl SettlementHook for RecordingSettlement {
    fn release(&self, request: &SettlementRequest) -> Result<(), SettlementError> {
        {
            let mut failing = self.failing.lock();
            if *failing > 0 {
                *failing -= 1;
                return Err(SettlementError("escrow unavailable".to_string()));
            }
        }
        self.released.lock().push(request.clone());
        Ok(())
    }
}
