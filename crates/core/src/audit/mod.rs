//! Append-only audit trail types.

mod types;

pub use types::{AuditAction, AuditEntry};
