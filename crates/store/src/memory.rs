//! In-memory store implementations backed by `DashMap`.
//!
//! `DashMap` entry guards give each key its own lock, which is exactly
//! the granularity the traits ask for: a request CAS or a ledger adjust
//! holds only its own key while it runs.

use dashmap::DashMap;

use fiscus_core::audit::AuditEntry;
use fiscus_core::ledger::{LedgerDelta, LedgerKey, LedgerTotals};
use fiscus_shared::types::{FiscalYearId, OrganizationId, RequestId};

use crate::error::StoreError;
use crate::traits::{AuditStore, LedgerStore, RequestStore, StoredRequest};

/// In-memory request store.
#[derive(Default)]
pub struct MemoryRequestStore {
    requests: DashMap<RequestId, StoredRequest>,
}

impl MemoryRequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for MemoryRequestStore {
    fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
        Ok(self.requests.get(&id).map(|entry| entry.clone()))
    }

    fn insert(&self, request: StoredRequest) -> Result<(), StoreError> {
        let id = request.id();
        match self.requests.entry(id) {
            dashmap::Entry::Occupied(_) => Err(StoreError::Duplicate(id)),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(request);
                Ok(())
            }
        }
    }

    fn update(&self, expected_version: i64, request: StoredRequest) -> Result<(), StoreError> {
        let id = request.id();
        // The entry guard holds the shard lock across the version check
        // and the write, making the CAS atomic.
        match self.requests.get_mut(&id) {
            None => Err(StoreError::Missing(id)),
            Some(mut current) => {
                let found = current.version();
                if found != expected_version {
                    return Err(StoreError::VersionConflict {
                        expected: expected_version,
                        found,
                    });
                }
                *current = request;
                Ok(())
            }
        }
    }

    fn restore(&self, request: StoredRequest) -> Result<(), StoreError> {
        self.requests.insert(request.id(), request);
        Ok(())
    }

    fn remove(&self, id: RequestId) -> Result<(), StoreError> {
        self.requests
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::Missing(id))
    }
}

/// In-memory ledger store.
#[derive(Default)]
pub struct MemoryLedgerStore {
    rows: DashMap<LedgerKey, LedgerTotals>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns one row's totals, zero if the row does not exist.
    #[must_use]
    pub fn totals(&self, key: &LedgerKey) -> LedgerTotals {
        self.rows.get(key).map(|entry| *entry).unwrap_or_default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn adjust(&self, key: LedgerKey, delta: LedgerDelta) -> Result<LedgerTotals, StoreError> {
        // or_default creates the row at zero; the entry guard keeps the
        // read-apply-write atomic per key.
        let mut row = self.rows.entry(key).or_default();
        let next = row.apply(delta)?;
        *row = next;
        Ok(next)
    }

    fn entries(
        &self,
        organization_id: OrganizationId,
        fiscal_year_id: FiscalYearId,
    ) -> Result<Vec<(LedgerKey, LedgerTotals)>, StoreError> {
        Ok(self
            .rows
            .iter()
            .filter(|entry| {
                entry.key().organization_id == organization_id
                    && entry.key().fiscal_year_id == fiscal_year_id
            })
            .map(|entry| (*entry.key(), *entry.value()))
            .collect())
    }
}

/// In-memory audit store.
#[derive(Default)]
pub struct MemoryAuditStore {
    trails: DashMap<RequestId, Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for MemoryAuditStore {
    fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.trails.entry(entry.request_id).or_default().push(entry);
        Ok(())
    }

    fn history(&self, request_id: RequestId) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self
            .trails
            .get(&request_id)
            .map(|trail| trail.clone())
            .unwrap_or_default())
    }
}
