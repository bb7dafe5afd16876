//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors applying a delta to ledger totals.
///
/// These are correctness bugs, not business rules: a well-behaved engine
/// never produces a delta that drives a counter negative. The adjustment
/// fails fatally rather than clamping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A counter would have gone below zero.
    #[error("{counter} would go negative: current {current}, delta {delta}")]
    NegativeCounter {
        /// Which counter: "allocated", "spent", or "pending".
        counter: &'static str,
        /// The counter value before the delta.
        current: Decimal,
        /// The rejected delta.
        delta: Decimal,
    },
}
