//! Workflow error taxonomy.
//!
//! Every engine operation resolves to one of these variants. The first five
//! are terminal business errors the caller can act on; `LedgerInvariant` is
//! a fatal defect and `Persistence` is retryable.

use fiscus_shared::types::RequestId;
use thiserror::Error;

use crate::fiscal::PeriodError;
use crate::ledger::LedgerError;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed or out-of-range payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Role/action/stage/ministry mismatch. Intentionally carries no
    /// detail about the request's internal state.
    #[error("Permission denied")]
    PermissionDenied,

    /// The action is not a legal edge from the current status.
    #[error("Action {action} is not valid from status {from}")]
    InvalidTransition {
        /// The current status.
        from: &'static str,
        /// The attempted action.
        action: &'static str,
    },

    /// The supplied version is stale; re-read and retry.
    #[error("Version conflict: supplied {supplied}, current {current}")]
    Conflict {
        /// The version the caller supplied.
        supplied: i64,
        /// The version currently stored.
        current: i64,
    },

    /// Unknown id or cross-organization access attempt. Indistinguishable
    /// to the caller for information hiding.
    #[error("Request {0} not found")]
    NotFound(RequestId),

    /// A ledger counter would have gone negative. A correctness bug, not a
    /// business rule; the transition is aborted, never clamped.
    #[error("Ledger invariant violated: {0}")]
    LedgerInvariant(String),

    /// Underlying storage failure. The caller retries the whole transition.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidTransition { .. } => 400,
            Self::PermissionDenied => 403,
            Self::NotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::LedgerInvariant(_) => 500,
            Self::Persistence(_) => 503,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Conflict { .. } => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::LedgerInvariant(_) => "LEDGER_INVARIANT_VIOLATION",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns true if the caller should retry the whole transition.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Conflict { .. })
    }
}

impl From<PeriodError> for WorkflowError {
    fn from(err: PeriodError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(err: LedgerError) -> Self {
        Self::LedgerInvariant(err.to_string())
    }
}
