//! Storage layer and workflow engine for Fiscus.
//!
//! This crate provides:
//! - Storage trait seams for requests, ledger rows, and the audit trail
//! - In-memory implementations backed by `DashMap`
//! - The [`WorkflowEngine`], which ties policy checks, the pure state
//!   machines from `fiscus-core`, and the three stores together
//! - A retry wrapper for transient failures

pub mod engine;
pub mod error;
pub mod memory;
pub mod retry;
pub mod traits;

pub use engine::WorkflowEngine;
pub use error::StoreError;
pub use memory::{MemoryAuditStore, MemoryLedgerStore, MemoryRequestStore};
pub use retry::with_retry;
pub use traits::{AuditStore, LedgerStore, RequestStore, StoredRequest};
