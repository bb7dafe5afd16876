//! Core business logic for Fiscus.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, state machines, and ledger math live here.
//!
//! # Modules
//!
//! - `fiscal` - Fiscal period types and validation
//! - `ledger` - Allocated/spent/pending budget ledger math
//! - `workflow` - Allocation and expense approval state machines
//! - `audit` - Append-only audit trail types

pub mod audit;
pub mod fiscal;
pub mod ledger;
pub mod workflow;
