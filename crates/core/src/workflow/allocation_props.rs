//! Property tests for the allocation state machine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use fiscus_shared::types::{FiscalYearId, MinistryId, OrganizationId, UserId};

use super::allocation::{
    AllocationFields, AllocationStatus, AllocationWorkflow, NewAllocationRequest, ReviewDecision,
};
use super::error::WorkflowError;
use crate::fiscal::Period;
use crate::ledger::{LedgerDelta, LedgerTotals};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
}

fn status_strategy() -> impl Strategy<Value = AllocationStatus> {
    prop_oneof![
        Just(AllocationStatus::Draft),
        Just(AllocationStatus::Submitted),
        Just(AllocationStatus::Approved),
        Just(AllocationStatus::Rejected),
    ]
}

fn request_at(status: AllocationStatus, amount: Decimal) -> super::allocation::AllocationRequest {
    let mut request = AllocationWorkflow::create(NewAllocationRequest {
        organization_id: OrganizationId::new(),
        fiscal_year_id: FiscalYearId::new(),
        ministry_id: MinistryId::new(),
        requester_id: UserId::new(),
        fields: AllocationFields {
            period: Period::annual(),
            requested_amount: amount,
            justification: "prop".to_string(),
            budget_breakdown: vec![],
        },
    })
    .unwrap();
    // Force the status; the transitions under test only read it.
    request.status = status;
    request
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// submit succeeds exactly from draft; approve/reject exactly from
    /// submitted. No other edges exist.
    #[test]
    fn prop_transition_graph_is_closed(
        status in status_strategy(),
        amount in amount_strategy(),
    ) {
        let request = request_at(status, amount);

        let submit = AllocationWorkflow::submit(&request);
        prop_assert_eq!(submit.is_ok(), status == AllocationStatus::Draft);

        let approve = AllocationWorkflow::review(
            &request,
            UserId::new(),
            &ReviewDecision::Approve { approved_amount: amount },
            None,
        );
        prop_assert_eq!(approve.is_ok(), status == AllocationStatus::Submitted);

        let reject = AllocationWorkflow::review(
            &request,
            UserId::new(),
            &ReviewDecision::Reject,
            Some("no".to_string()),
        );
        prop_assert_eq!(reject.is_ok(), status == AllocationStatus::Submitted);

        let edit_fields = AllocationFields {
            period: Period::annual(),
            requested_amount: amount,
            justification: "edited".to_string(),
            budget_breakdown: vec![],
        };
        let edit = AllocationWorkflow::edit(&request, edit_fields);
        prop_assert_eq!(edit.is_ok(), status == AllocationStatus::Draft);

        prop_assert_eq!(
            AllocationWorkflow::check_discard(&request).is_ok(),
            status == AllocationStatus::Draft
        );
    }

    /// Approval never grants more than was requested, and the ledger
    /// delta always matches the granted amount exactly.
    #[test]
    fn prop_approved_amount_bounded(
        requested in amount_strategy(),
        granted in amount_strategy(),
    ) {
        let request = request_at(AllocationStatus::Submitted, requested);
        let result = AllocationWorkflow::review(
            &request,
            UserId::new(),
            &ReviewDecision::Approve { approved_amount: granted },
            None,
        );

        if granted > requested {
            prop_assert!(matches!(result, Err(WorkflowError::Validation(_))));
        } else {
            let transition = result.unwrap();
            prop_assert_eq!(transition.request.approved_amount, Some(granted));
            prop_assert_eq!(transition.delta, LedgerDelta::allocate(granted));
            // The delta applies cleanly to an empty ledger row.
            let totals = LedgerTotals::default().apply(transition.delta).unwrap();
            prop_assert_eq!(totals.allocated, granted);
            prop_assert_eq!(totals.remaining(), granted);
        }
    }

    /// Every successful transition bumps the version by exactly one.
    #[test]
    fn prop_versions_increase_by_one(amount in amount_strategy()) {
        let request = request_at(AllocationStatus::Draft, amount);
        let submitted = AllocationWorkflow::submit(&request).unwrap();
        prop_assert_eq!(submitted.version, request.version + 1);

        let reviewed = AllocationWorkflow::review(
            &submitted,
            UserId::new(),
            &ReviewDecision::Approve { approved_amount: amount },
            None,
        )
        .unwrap();
        prop_assert_eq!(reviewed.request.version, submitted.version + 1);
    }
}
