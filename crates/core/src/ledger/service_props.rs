//! Property tests for ledger totals and deltas.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{LedgerDelta, LedgerTotals};

/// Strategy for non-negative amounts with 2 decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a lifecycle-shaped delta: hold, then settle or release.
fn lifecycle_strategy() -> impl Strategy<Value = (Decimal, bool)> {
    (amount_strategy(), any::<bool>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// remaining == allocated - spent - pending after any sequence of
    /// successful adjustments.
    #[test]
    fn prop_remaining_identity(
        allocations in prop::collection::vec(amount_strategy(), 0..8),
        lifecycles in prop::collection::vec(lifecycle_strategy(), 0..8),
    ) {
        let mut totals = LedgerTotals::default();
        for amount in &allocations {
            totals = totals.apply(LedgerDelta::allocate(*amount)).unwrap();
        }
        for (amount, approve) in &lifecycles {
            totals = totals.apply(LedgerDelta::hold(*amount)).unwrap();
            let delta = if *approve {
                LedgerDelta::settle(*amount)
            } else {
                LedgerDelta::release(*amount)
            };
            totals = totals.apply(delta).unwrap();
        }

        prop_assert_eq!(
            totals.remaining(),
            totals.allocated - totals.spent - totals.pending
        );
        // Pending returns to zero once every lifecycle completed.
        prop_assert_eq!(totals.pending, Decimal::ZERO);
    }

    /// Deltas accumulate commutatively: applying a set of deltas in any
    /// two orders yields the same totals (no lost updates by ordering).
    #[test]
    fn prop_commutative_accumulation(
        amounts in prop::collection::vec(amount_strategy(), 1..10),
    ) {
        let forward = amounts
            .iter()
            .try_fold(LedgerTotals::default(), |acc, amount| {
                acc.apply(LedgerDelta::hold(*amount))
            })
            .unwrap();
        let backward = amounts
            .iter()
            .rev()
            .try_fold(LedgerTotals::default(), |acc, amount| {
                acc.apply(LedgerDelta::hold(*amount))
            })
            .unwrap();

        prop_assert_eq!(forward, backward);
        let expected: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(forward.pending, expected);
    }

    /// Counters never go negative: a release larger than the held amount
    /// always fails and leaves nothing applied.
    #[test]
    fn prop_overdraw_rejected(
        held in amount_strategy(),
        extra in (1i64..1_000_000).prop_map(|n| Decimal::new(n, 2)),
    ) {
        let totals = LedgerTotals::default()
            .apply(LedgerDelta::hold(held))
            .unwrap();
        let result = totals.apply(LedgerDelta::release(held + extra));
        prop_assert!(result.is_err());
    }

    /// A delta followed by its inverse is the identity.
    #[test]
    fn prop_inverse_roundtrip(amount in amount_strategy()) {
        let base = LedgerTotals::default()
            .apply(LedgerDelta::allocate(amount))
            .unwrap()
            .apply(LedgerDelta::hold(amount))
            .unwrap();
        let delta = LedgerDelta::settle(amount);
        let there = base.apply(delta).unwrap();
        let back = there.apply(delta.inverse()).unwrap();
        prop_assert_eq!(back, base);
    }
}
