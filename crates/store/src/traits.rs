//! Storage trait seams for the workflow engine.
//!
//! The engine is generic over these traits so the in-memory stores in
//! [`crate::memory`] and any future backed implementation are
//! interchangeable. All methods take `&self`; implementations handle
//! their own interior synchronization.

use fiscus_core::audit::AuditEntry;
use fiscus_core::ledger::{LedgerDelta, LedgerKey, LedgerTotals};
use fiscus_core::workflow::{AllocationRequest, ExpenseRequest};
use fiscus_shared::types::{FiscalYearId, OrganizationId, RequestId, UserId};

use crate::error::StoreError;

/// Either kind of request, as stored.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRequest {
    /// A budget allocation request.
    Allocation(AllocationRequest),
    /// An expense request.
    Expense(ExpenseRequest),
}

impl StoredRequest {
    /// The request id.
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Allocation(r) => r.id,
            Self::Expense(r) => r.id,
        }
    }

    /// The current version.
    #[must_use]
    pub fn version(&self) -> i64 {
        match self {
            Self::Allocation(r) => r.version,
            Self::Expense(r) => r.version,
        }
    }

    /// The owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        match self {
            Self::Allocation(r) => r.organization_id,
            Self::Expense(r) => r.organization_id,
        }
    }

    /// The requesting user.
    #[must_use]
    pub fn requester_id(&self) -> UserId {
        match self {
            Self::Allocation(r) => r.requester_id,
            Self::Expense(r) => r.requester_id,
        }
    }

    /// The current status as its wire string.
    #[must_use]
    pub fn status_str(&self) -> &'static str {
        match self {
            Self::Allocation(r) => r.status.as_str(),
            Self::Expense(r) => r.status.as_str(),
        }
    }
}

impl From<AllocationRequest> for StoredRequest {
    fn from(request: AllocationRequest) -> Self {
        Self::Allocation(request)
    }
}

impl From<ExpenseRequest> for StoredRequest {
    fn from(request: ExpenseRequest) -> Self {
        Self::Expense(request)
    }
}

/// Persistence for requests of both kinds.
pub trait RequestStore: Send + Sync {
    /// Fetches a request by id.
    fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError>;

    /// Inserts a new request. Fails with `Duplicate` if the id exists.
    fn insert(&self, request: StoredRequest) -> Result<(), StoreError>;

    /// Replaces a request if and only if the stored version equals
    /// `expected_version` (compare-and-swap).
    fn update(&self, expected_version: i64, request: StoredRequest) -> Result<(), StoreError>;

    /// Puts a request back unconditionally. Used only to roll a request
    /// back to its prior value during commit compensation.
    fn restore(&self, request: StoredRequest) -> Result<(), StoreError>;

    /// Removes a request by id.
    fn remove(&self, id: RequestId) -> Result<(), StoreError>;
}

/// Persistence for ledger rows.
pub trait LedgerStore: Send + Sync {
    /// Atomically applies a delta to one row, creating it at zero first
    /// if absent, and returns the new totals. The read-apply-write must
    /// not interleave with a concurrent adjust of the same key.
    fn adjust(&self, key: LedgerKey, delta: LedgerDelta) -> Result<LedgerTotals, StoreError>;

    /// Returns all rows for one organization and fiscal year.
    fn entries(
        &self,
        organization_id: OrganizationId,
        fiscal_year_id: FiscalYearId,
    ) -> Result<Vec<(LedgerKey, LedgerTotals)>, StoreError>;
}

/// Persistence for the append-only audit trail.
pub trait AuditStore: Send + Sync {
    /// Appends one entry. Entries are never modified afterwards.
    fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;

    /// Returns a request's trail in append order.
    fn history(&self, request_id: RequestId) -> Result<Vec<AuditEntry>, StoreError>;
}

// Shared handles work anywhere a store does, so a caller can hand the
// engine a store and keep a handle for direct inspection.

impl<T: RequestStore> RequestStore for std::sync::Arc<T> {
    fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
        (**self).get(id)
    }

    fn insert(&self, request: StoredRequest) -> Result<(), StoreError> {
        (**self).insert(request)
    }

    fn update(&self, expected_version: i64, request: StoredRequest) -> Result<(), StoreError> {
        (**self).update(expected_version, request)
    }

    fn restore(&self, request: StoredRequest) -> Result<(), StoreError> {
        (**self).restore(request)
    }

    fn remove(&self, id: RequestId) -> Result<(), StoreError> {
        (**self).remove(id)
    }
}

impl<T: LedgerStore> LedgerStore for std::sync::Arc<T> {
    fn adjust(&self, key: LedgerKey, delta: LedgerDelta) -> Result<LedgerTotals, StoreError> {
        (**self).adjust(key, delta)
    }

    fn entries(
        &self,
        organization_id: OrganizationId,
        fiscal_year_id: FiscalYearId,
    ) -> Result<Vec<(LedgerKey, LedgerTotals)>, StoreError> {
        (**self).entries(organization_id, fiscal_year_id)
    }
}

impl<T: AuditStore> AuditStore for std::sync::Arc<T> {
    fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        (**self).append(entry)
    }

    fn history(&self, request_id: RequestId) -> Result<Vec<AuditEntry>, StoreError> {
        (**self).history(request_id)
    }
}
