//! Synchronization errors.

use thiserror::Error;

use super::document::GameId;
use super::store::StoreError;
use crate::core::RuleError;

/// Result type alias for acceptor operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Why a synchronized operation did not commit.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The transition failed legality or turn checks against the fresh read.
    #[error("rejected: {0}")]
    Rule(#[from] RuleError),

    #[error("seat is not part of this game")]
    UnknownSeat,

    #[error("game {0} not found")]
    NotFound(GameId),

    #[error("game {0} already exists")]
    AlreadyExists(GameId),

    /// The store could not be reached; safe to retry.
    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("stored document is malformed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every write attempt lost a race to a concurrent writer.
    #[error("write lost to concurrent updates")]
    StaleWrite,
}

impl SyncError {
    /// Check if the caller should re-fetch and try again later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, SyncError::Persistence(_) | SyncError::StaleWrite)
    }

    /// The rule rejection, if that is what this is.
    #[must_use]
    pub const fn rule(&self) -> Option<&RuleError> {
        match self {
            SyncError::Rule(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => SyncError::NotFound(id),
            StoreError::Unavailable(reason) => SyncError::Persistence(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: SyncError = StoreError::Unavailable("timeout".into()).into();
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "persistence failure: timeout");

        let err: SyncError = StoreError::NotFound(GameId::new("g1")).into();
        assert!(matches!(err, SyncError::NotFound(ref id) if id.as_str() == "g1"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_rule_error_wraps() {
        let err = SyncError::from(RuleError::NotYourTurn);
        assert_eq!(err.rule(), Some(&RuleError::NotYourTurn));
        assert_eq!(err.to_string(), "rejected: not this side's turn");
    }
}
