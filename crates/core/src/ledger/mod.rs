//! Allocated/spent/pending budget ledger math.
//!
//! The ledger keeps one row per (organization, fiscal year, ministry,
//! period). `remaining` is always derived, never stored, which removes a
//! whole class of drift bugs.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{BudgetSummary, LedgerDelta, LedgerKey, LedgerTotals, MinistrySummary};
