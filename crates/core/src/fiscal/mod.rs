//! Fiscal period types and validation.

pub mod period;

pub use period::{Period, PeriodError, PeriodType};
