//! Ledger summary aggregation.

use std::collections::BTreeMap;

use fiscus_shared::types::{FiscalYearId, MinistryId, OrganizationId};
use rust_decimal::Decimal;

use super::types::{BudgetSummary, LedgerKey, LedgerTotals, MinistrySummary};

/// Stateless ledger service.
///
/// Pure aggregation over committed ledger rows; the store supplies the
/// rows, this service never mutates them.
pub struct LedgerService;

impl LedgerService {
    /// Utilization as a percentage, rounded to 2 decimal places.
    ///
    /// Zero when nothing is allocated - never a division fault.
    #[must_use]
    pub fn utilization_percent(spent: Decimal, allocated: Decimal) -> Decimal {
        if allocated.is_zero() {
            Decimal::ZERO
        } else {
            (spent / allocated * Decimal::ONE_HUNDRED).round_dp(2)
        }
    }

    /// Aggregates ledger rows into per-ministry and organization totals.
    ///
    /// Rows for other organizations or fiscal years are ignored, so a
    /// caller may pass an unfiltered row iterator.
    #[must_use]
    pub fn summarize<I>(
        organization_id: OrganizationId,
        fiscal_year_id: FiscalYearId,
        rows: I,
    ) -> BudgetSummary
    where
        I: IntoIterator<Item = (LedgerKey, LedgerTotals)>,
    {
        // BTreeMap keyed by ministry UUID keeps the output order stable.
        let mut by_ministry: BTreeMap<uuid::Uuid, (MinistryId, LedgerTotals)> = BTreeMap::new();

        for (key, totals) in rows {
            if key.organization_id != organization_id || key.fiscal_year_id != fiscal_year_id {
                continue;
            }
            let entry = by_ministry
                .entry(key.ministry_id.into_inner())
                .or_insert((key.ministry_id, LedgerTotals::default()));
            entry.1.allocated += totals.allocated;
            entry.1.spent += totals.spent;
            entry.1.pending += totals.pending;
        }

        let mut allocated = Decimal::ZERO;
        let mut spent = Decimal::ZERO;
        let mut pending = Decimal::ZERO;

        let ministries = by_ministry
            .into_values()
            .map(|(ministry_id, totals)| {
                allocated += totals.allocated;
                spent += totals.spent;
                pending += totals.pending;
                MinistrySummary {
                    ministry_id,
                    allocated: totals.allocated,
                    spent: totals.spent,
                    pending: totals.pending,
                    remaining: totals.remaining(),
                    utilization_percent: Self::utilization_percent(totals.spent, totals.allocated),
                }
            })
            .collect();

        BudgetSummary {
            organization_id,
            fiscal_year_id,
            ministries,
            allocated,
            spent,
            pending,
            remaining: allocated - spent - pending,
            utilization_percent: Self::utilization_percent(spent, allocated),
        }
    }
}
