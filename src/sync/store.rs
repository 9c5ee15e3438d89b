//! Persistence boundary for game documents.
//!
//! The store is deliberately dumb: it holds JSON blobs keyed by game id and
//! enforces exactly one rule, compare-and-swap on `lastUpdated`. All game
//! logic lives in the acceptor, which re-validates against a fresh `get`
//! before every `put`.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::document::{GameId, SeatId};

/// A stored document and its version stamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRecord {
    pub json: String,
    pub last_updated: DateTime<Utc>,
}

/// A whole-document write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutRequest {
    pub game_id: GameId,
    pub json: String,
    /// Seat whose action produced this write; `None` for system writes.
    pub acting_seat: Option<SeatId>,
    /// Version the write was validated against; `None` to create.
    pub expected: Option<DateTime<Utc>>,
    /// Version stamp of the new document.
    pub last_updated: DateTime<Utc>,
    /// The document is finished and becomes read-only.
    pub finished: bool,
}

/// Why a write was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// The stored version no longer matches `expected`.
    StaleVersion,
    /// A create hit an existing document.
    AlreadyExists,
    /// The document is finished and archived.
    Archived,
}

/// Result of a write that reached the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    Ack,
    Rejected(RejectReason),
}

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("game {0} not found")]
    NotFound(GameId),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Authoritative document storage.
pub trait GameStore: Send + Sync {
    /// Read the current document.
    fn get(&self, game_id: &GameId) -> Result<StoredRecord, StoreError>;

    /// Write a whole document, conditional on `expected`.
    fn put(&self, request: PutRequest) -> Result<PutOutcome, StoreError>;
}

impl<T: GameStore + ?Sized> GameStore for Arc<T> {
    fn get(&self, game_id: &GameId) -> Result<StoredRecord, StoreError> {
        (**self).get(game_id)
    }

    fn put(&self, request: PutRequest) -> Result<PutOutcome, StoreError> {
        (**self).put(request)
    }
}

impl<T: GameStore + ?Sized> GameStore for &T {
    fn get(&self, game_id: &GameId) -> Result<StoredRecord, StoreError> {
        (**self).get(game_id)
    }

    fn put(&self, request: PutRequest) -> Result<PutOutcome, StoreError> {
        (**self).put(request)
    }
}

#[derive(Clone, Debug)]
struct Entry {
    record: StoredRecord,
    archived: bool,
    last_writer: Option<SeatId>,
}

/// In-process store with failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<FxHashMap<GameId, Entry>>,
    failing_reads: Mutex<u32>,
    failing_writes: Mutex<u32>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` reads with `Unavailable`.
    pub fn fail_next_reads(&self, count: u32) {
        *self.failing_reads.lock() = count;
    }

    /// Fail the next `count` writes with `Unavailable`.
    pub fn fail_next_writes(&self, count: u32) {
        *self.failing_writes.lock() = count;
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Check if a document has been archived.
    #[must_use]
    pub fn is_archived(&self, game_id: &GameId) -> bool {
        self.entries.read().get(game_id).is_some_and(|e| e.archived)
    }

    /// Seat that made the latest accepted write.
    #[must_use]
    pub fn last_writer(&self, game_id: &GameId) -> Option<SeatId> {
        self.entries.read().get(game_id).and_then(|e| e.last_writer.clone())
    }

    fn injected_failure(counter: &Mutex<u32>, what: &str) -> Result<(), StoreError> {
        let mut remaining = counter.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(StoreError::Unavailable(format!("injected {what} failure")));
        }
        Ok(())
    }
}

impl GameStore for MemoryStore {
    fn get(&self, game_id: &GameId) -> Result<StoredRecord, StoreError> {
        Self::injected_failure(&self.failing_reads, "read")?;
        self.entries
            .read()
            .get(game_id)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| StoreError::NotFound(game_id.clone()))
    }

    fn put(&self, request: PutRequest) -> Result<PutOutcome, StoreError> {
        Self::injected_failure(&self.failing_writes, "write")?;
        let mut entries = self.entries.write();
        let entry = Entry {
            record: StoredRecord {
                json: request.json,
                last_updated: request.last_updated,
            },
            archived: request.finished,
            last_writer: request.acting_seat,
        };

        match (request.expected, entries.get(&request.game_id)) {
            (None, Some(_)) => return Ok(PutOutcome::Rejected(RejectReason::AlreadyExists)),
            (None, None) => {}
            (Some(_), None) => return Err(StoreError::NotFound(request.game_id)),
            (Some(_), Some(current)) if current.archived => {
                return Ok(PutOutcome::Rejected(RejectReason::Archived));
            }
            (Some(expected), Some(current)) if current.record.last_updated != expected => {
                return Ok(PutOutcome::Rejected(RejectReason::StaleVersion));
            }
            (Some(_), Some(_)) => {}
        }

        entries.insert(request.game_id, entry);
        Ok(PutOutcome::Ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn put(id: &str, expected: Option<i64>, version: i64, finished: bool) -> PutRequest {
        PutRequest {
            game_id: GameId::new(id),
            json: format!("{{\"v\":{version}}}"),
            acting_seat: Some(SeatId::new("alice")),
            expected: expected.map(at),
            last_updated: at(version),
            finished,
        }
    }

    #[test]
    fn test_create_and_read() {
        let store = MemoryStore::new();
        assert_eq!(store.put(put("g", None, 0, false)), Ok(PutOutcome::Ack));
        let record = store.get(&GameId::new("g")).unwrap();
        assert_eq!(record.last_updated, at(0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.last_writer(&GameId::new("g")), Some(SeatId::new("alice")));

        assert_eq!(
            store.put(put("g", None, 1, false)),
            Ok(PutOutcome::Rejected(RejectReason::AlreadyExists))
        );
    }

    #[test]
    fn test_compare_and_swap() {
        let store = MemoryStore::new();
        store.put(put("g", None, 0, false)).unwrap();
        assert_eq!(store.put(put("g", Some(0), 1, false)), Ok(PutOutcome::Ack));
        assert_eq!(
            store.put(put("g", Some(0), 2, false)),
            Ok(PutOutcome::Rejected(RejectReason::StaleVersion))
        );
        assert_eq!(store.get(&GameId::new("g")).unwrap().last_updated, at(1));
    }

    #[test]
    fn test_finished_documents_are_archived() {
        let store = MemoryStore::new();
        store.put(put("g", None, 0, false)).unwrap();
        store.put(put("g", Some(0), 1, true)).unwrap();
        assert!(store.is_archived(&GameId::new("g")));
        assert_eq!(
            store.put(put("g", Some(1), 2, false)),
            Ok(PutOutcome::Rejected(RejectReason::Archived))
        );
    }

    #[test]
    fn test_missing_document() {
        let store = MemoryStore::new();
        assert_eq!(
            store.get(&GameId::new("nope")),
            Err(StoreError::NotFound(GameId::new("nope")))
        );
        assert_eq!(
            store.put(put("nope", Some(0), 1, false)),
            Err(StoreError::NotFound(GameId::new("nope")))
        );
    }

    #[test]
    fn test_failure_injection() {
        let store = MemoryStore::new();
        store.fail_next_writes(1);
        assert!(matches!(store.put(put("g", None, 0, false)), Err(StoreError::Unavailable(_))));
        assert_eq!(store.put(put("g", None, 0, false)), Ok(PutOutcome::Ack));

        store.fail_next_reads(2);
        assert!(store.get(&GameId::new("g")).is_err());
        assert!(store.get(&GameId::new("g")).is_err());
        assert!(store.get(&GameId::new("g")).is_ok());
    }
}
