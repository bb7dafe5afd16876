//! Ledger domain types.

use fiscus_shared::types::{FiscalYearId, MinistryId, OrganizationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::fiscal::Period;

/// Identifies one budget ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Fiscal year the row is scoped to.
    pub fiscal_year_id: FiscalYearId,
    /// Ministry the row belongs to.
    pub ministry_id: MinistryId,
    /// Period within the fiscal year.
    pub period: Period,
}

/// Aggregated totals for one ledger key.
///
/// All three counters are >= 0 by construction; `remaining` is derived on
/// read and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Approved budget granted.
    pub allocated: Decimal,
    /// Finalized approved expenses.
    pub spent: Decimal,
    /// In-flight expense amounts not yet finalized.
    pub pending: Decimal,
}

impl LedgerTotals {
    /// Derived remaining budget: allocated - spent - pending.
    ///
    /// May be negative when expenses outrun allocations; the individual
    /// counters never are.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.allocated - self.spent - self.pending
    }

    /// Applies a delta, returning the new totals.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeCounter` if any counter would go
    /// below zero. The totals are left untouched in that case.
    pub fn apply(&self, delta: LedgerDelta) -> Result<Self, LedgerError> {
        let next = Self {
            allocated: self.allocated + delta.allocated,
            spent: self.spent + delta.spent,
            pending: self.pending + delta.pending,
        };

        if next.allocated < Decimal::ZERO {
            return Err(LedgerError::NegativeCounter {
                counter: "allocated",
                current: self.allocated,
                delta: delta.allocated,
            });
        }
        if next.spent < Decimal::ZERO {
            return Err(LedgerError::NegativeCounter {
                counter: "spent",
                current: self.spent,
                delta: delta.spent,
            });
        }
        if next.pending < Decimal::ZERO {
            return Err(LedgerError::NegativeCounter {
                counter: "pending",
                current: self.pending,
                delta: delta.pending,
            });
        }

        Ok(next)
    }
}

/// A signed adjustment to one ledger row.
///
/// Deltas are produced by the workflow state machines and applied by the
/// ledger store; nothing else mutates ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerDelta {
    /// Change to the allocated counter.
    pub allocated: Decimal,
    /// Change to the spent counter.
    pub spent: Decimal,
    /// Change to the pending counter.
    pub pending: Decimal,
}

impl LedgerDelta {
    /// The zero delta.
    pub const ZERO: Self = Self {
        allocated: Decimal::ZERO,
        spent: Decimal::ZERO,
        pending: Decimal::ZERO,
    };

    /// Allocation approval: grant budget.
    #[must_use]
    pub fn allocate(amount: Decimal) -> Self {
        Self {
            allocated: amount,
            ..Self::ZERO
        }
    }

    /// Expense enters its first pending stage: hold the amount.
    #[must_use]
    pub fn hold(amount: Decimal) -> Self {
        Self {
            pending: amount,
            ..Self::ZERO
        }
    }

    /// Terminal expense approval: move the held amount to spent.
    #[must_use]
    pub fn settle(amount: Decimal) -> Self {
        Self {
            spent: amount,
            pending: -amount,
            ..Self::ZERO
        }
    }

    /// Terminal expense denial: release the held amount.
    #[must_use]
    pub fn release(amount: Decimal) -> Self {
        Self {
            pending: -amount,
            ..Self::ZERO
        }
    }

    /// Returns the exact inverse of this delta, used for compensation.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            allocated: -self.allocated,
            spent: -self.spent,
            pending: -self.pending,
        }
    }

    /// Returns true if applying this delta would be a no-op.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.allocated.is_zero() && self.spent.is_zero() && self.pending.is_zero()
    }
}

/// Per-ministry slice of a budget summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinistrySummary {
    /// The ministry.
    pub ministry_id: MinistryId,
    /// Total allocated across the ministry's periods.
    pub allocated: Decimal,
    /// Total spent.
    pub spent: Decimal,
    /// Total pending.
    pub pending: Decimal,
    /// Derived remaining.
    pub remaining: Decimal,
    /// spent / allocated as a percentage, 0 when nothing is allocated.
    pub utilization_percent: Decimal,
}

/// Organization-wide budget summary for one fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// The organization.
    pub organization_id: OrganizationId,
    /// The fiscal year.
    pub fiscal_year_id: FiscalYearId,
    /// Per-ministry totals, ordered by ministry id for stable output.
    pub ministries: Vec<MinistrySummary>,
    /// Total allocated across all ministries.
    pub allocated: Decimal,
    /// Total spent.
    pub spent: Decimal,
    /// Total pending.
    pub pending: Decimal,
    /// Derived remaining.
    pub remaining: Decimal,
    /// spent / allocated as a percentage, 0 when nothing is allocated.
    pub utilization_percent: Decimal,
}
