//! Storage error types and their workflow-error mapping.

use fiscus_shared::types::RequestId;
use thiserror::Error;

use fiscus_core::ledger::LedgerError;
use fiscus_core::workflow::WorkflowError;

/// Errors from a request, ledger, or audit store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is unreachable or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A compare-and-swap update saw a different version than expected.
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict {
        /// The version the caller expected.
        expected: i64,
        /// The version actually stored.
        found: i64,
    },

    /// Insert of an id that already exists.
    #[error("duplicate request {0}")]
    Duplicate(RequestId),

    /// Update or remove of an id that does not exist.
    #[error("request {0} not found")]
    Missing(RequestId),

    /// A ledger adjustment would have violated a counter invariant.
    #[error(transparent)]
    Invariant(#[from] LedgerError),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::Persistence(msg),
            StoreError::VersionConflict { expected, found } => Self::Conflict {
                supplied: expected,
                current: found,
            },
            StoreError::Duplicate(id) => Self::Persistence(format!("duplicate request {id}")),
            StoreError::Missing(id) => Self::NotFound(id),
            StoreError::Invariant(inner) => Self::LedgerInvariant(inner.to_string()),
        }
    }
}
