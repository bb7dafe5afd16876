//! Property tests for the expense approval chain.

use proptest::prelude::*;
use rust_decimal::Decimal;

use fiscus_shared::types::{FiscalYearId, MinistryId, OrganizationId, UserId};

use super::expense::{ExpenseAction, ExpenseStatus, ExpenseWorkflow, NewExpenseRequest};
use super::policy::Role;
use crate::fiscal::Period;
use crate::ledger::{LedgerDelta, LedgerTotals};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// A decision script: at each stage, approve (true) or deny (false).
fn script_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 3)
}

fn pending(amount: Decimal) -> super::expense::ExpenseRequest {
    ExpenseWorkflow::create(
        NewExpenseRequest {
            organization_id: OrganizationId::new(),
            fiscal_year_id: FiscalYearId::new(),
            ministry_id: MinistryId::new(),
            requester_id: UserId::new(),
            period: Period::annual(),
            amount,
            category: "prop".to_string(),
            description: None,
        },
        true,
    )
    .unwrap()
    .request
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever decisions are made, the lifecycle holds the amount exactly
    /// once and resolves it exactly once: after the terminal edge the
    /// pending counter is back to zero, and spent equals the amount iff
    /// the request ended approved.
    #[test]
    fn prop_pending_resolved_exactly_once(
        amount in amount_strategy(),
        script in script_strategy(),
        threshold_offset in prop::option::of(-500i64..500),
    ) {
        let transition = ExpenseWorkflow::create(
            NewExpenseRequest {
                organization_id: OrganizationId::new(),
                fiscal_year_id: FiscalYearId::new(),
                ministry_id: MinistryId::new(),
                requester_id: UserId::new(),
                period: Period::annual(),
                amount,
                category: "prop".to_string(),
                description: None,
            },
            true,
        )
        .unwrap();
        let threshold = threshold_offset.map(|o| amount + Decimal::new(o, 2));

        let mut totals = LedgerTotals {
            allocated: amount * Decimal::TWO,
            ..LedgerTotals::default()
        };
        totals = totals.apply(transition.delta).unwrap();
        prop_assert_eq!(totals.pending, amount);

        let mut request = transition.request;
        let mut decisions = script.into_iter();
        while !request.status.is_terminal() {
            let approve = decisions.next().unwrap();
            let (action, notes) = if approve {
                (ExpenseAction::Approve, None)
            } else {
                (ExpenseAction::Deny, Some("no".to_string()))
            };
            let step = ExpenseWorkflow::advance(
                &request,
                UserId::new(),
                Role::Admin,
                action,
                notes,
                threshold,
            );
            let step = match step {
                Ok(step) => step,
                // The only refusable script step is deny-at-finance.
                Err(_) => {
                    prop_assert_eq!(request.status, ExpenseStatus::PendingFinance);
                    ExpenseWorkflow::advance(
                        &request,
                        UserId::new(),
                        Role::Admin,
                        ExpenseAction::Approve,
                        None,
                        threshold,
                    )
                    .unwrap()
                }
            };
            totals = totals.apply(step.delta).unwrap();
            request = step.request;
        }

        prop_assert_eq!(totals.pending, Decimal::ZERO);
        if request.status.is_approved() {
            prop_assert_eq!(totals.spent, amount);
        } else {
            prop_assert_eq!(totals.spent, Decimal::ZERO);
        }
        prop_assert_eq!(
            totals.remaining(),
            totals.allocated - totals.spent
        );
    }

    /// Terminal and draft statuses accept no stage decisions at all.
    #[test]
    fn prop_non_pending_statuses_are_inert(
        amount in amount_strategy(),
        deny in any::<bool>(),
    ) {
        for status in [
            ExpenseStatus::Draft,
            ExpenseStatus::LeaderApproved,
            ExpenseStatus::TreasuryApproved,
            ExpenseStatus::LeaderDenied,
            ExpenseStatus::TreasuryDenied,
        ] {
            let mut request = pending(amount);
            request.status = status;
            let action = if deny { ExpenseAction::Deny } else { ExpenseAction::Approve };
            let result = ExpenseWorkflow::advance(
                &request,
                UserId::new(),
                Role::Admin,
                action,
                Some("notes".to_string()),
                None,
            );
            prop_assert!(result.is_err());
        }
    }

    /// The leader threshold splits leader approvals cleanly: at or under
    /// finishes as leader_approved, over escalates to treasury.
    #[test]
    fn prop_leader_threshold_split(
        amount in amount_strategy(),
        threshold in amount_strategy(),
    ) {
        let request = pending(amount);
        let transition = ExpenseWorkflow::advance(
            &request,
            UserId::new(),
            Role::MinistryLeader,
            ExpenseAction::Approve,
            None,
            Some(threshold),
        )
        .unwrap();

        if amount <= threshold {
            prop_assert_eq!(transition.request.status, ExpenseStatus::LeaderApproved);
            prop_assert_eq!(transition.delta, LedgerDelta::settle(amount));
        } else {
            prop_assert_eq!(transition.request.status, ExpenseStatus::PendingTreasury);
            prop_assert!(transition.delta.is_zero());
        }
    }
}
