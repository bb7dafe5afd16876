//! Allocation request lifecycle.
//!
//! Ministries request budget allocations for a period of the fiscal year.
//! The state machine is small: `draft → submitted → {approved | rejected}`.
//! Drafts may be edited in place any number of times before submission;
//! both terminal states are final.

use chrono::{DateTime, Utc};
use fiscus_shared::types::{FiscalYearId, MinistryId, OrganizationId, RequestId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fiscal::Period;
use crate::ledger::{LedgerDelta, LedgerKey};
use crate::workflow::error::WorkflowError;

/// Allocation request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    /// Being drafted; editable by the requester.
    Draft,
    /// Submitted for review; awaiting a reviewer decision.
    Submitted,
    /// Approved with an approved amount (terminal).
    Approved,
    /// Rejected with notes (terminal).
    Rejected,
}

impl AllocationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the request can still be modified in place.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the status has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of an optional budget breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    /// Spending category.
    pub category: String,
    /// What the line covers.
    pub description: String,
    /// Amount for this line (>= 0).
    pub amount: Decimal,
}

/// Mutable fields of an allocation request, supplied on create and edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationFields {
    /// Period the allocation is requested for.
    pub period: Period,
    /// Requested amount (positive).
    pub requested_amount: Decimal,
    /// Why the allocation is needed (non-empty).
    pub justification: String,
    /// Optional itemized breakdown.
    pub budget_breakdown: Vec<BreakdownItem>,
}

/// Input for creating an allocation request.
#[derive(Debug, Clone)]
pub struct NewAllocationRequest {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Fiscal year the request is scoped to.
    pub fiscal_year_id: FiscalYearId,
    /// Ministry the allocation is for.
    pub ministry_id: MinistryId,
    /// The requesting user.
    pub requester_id: UserId,
    /// Request fields.
    pub fields: AllocationFields,
}

/// Reviewer decision on a submitted allocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum ReviewDecision {
    /// Approve, possibly for less than was requested.
    Approve {
        /// The granted amount (positive, <= requested).
        approved_amount: Decimal,
    },
    /// Reject; notes are required.
    Reject,
}

/// A budget allocation request.
///
/// Mutated only through [`AllocationWorkflow`] once submitted; the status
/// field is a cached projection of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Fiscal year the request is scoped to.
    pub fiscal_year_id: FiscalYearId,
    /// Ministry the allocation is for.
    pub ministry_id: MinistryId,
    /// The requesting user.
    pub requester_id: UserId,
    /// Period the allocation is requested for.
    pub period: Period,
    /// Requested amount (positive).
    pub requested_amount: Decimal,
    /// Granted amount; set on approval, always <= requested.
    pub approved_amount: Option<Decimal>,
    /// Why the allocation is needed.
    pub justification: String,
    /// Optional itemized breakdown.
    pub budget_breakdown: Vec<BreakdownItem>,
    /// Current status.
    pub status: AllocationStatus,
    /// Monotonically increasing version for optimistic concurrency.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the request was submitted for review.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the request was reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Who reviewed the request.
    pub reviewed_by: Option<UserId>,
    /// Reviewer notes.
    pub review_notes: Option<String>,
}

impl AllocationRequest {
    /// The ledger row this request maps to.
    #[must_use]
    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey {
            organization_id: self.organization_id,
            fiscal_year_id: self.fiscal_year_id,
            ministry_id: self.ministry_id,
            period: self.period,
        }
    }

    /// Sum of the breakdown line amounts.
    #[must_use]
    pub fn breakdown_total(&self) -> Decimal {
        self.budget_breakdown.iter().map(|item| item.amount).sum()
    }

    /// Difference between the breakdown total and the requested amount.
    ///
    /// `None` when there is no breakdown or the totals agree. A mismatch
    /// is surfaced to callers and logged, never silently corrected.
    #[must_use]
    pub fn breakdown_variance(&self) -> Option<Decimal> {
        if self.budget_breakdown.is_empty() {
            return None;
        }
        let diff = self.breakdown_total() - self.requested_amount;
        if diff.is_zero() { None } else { Some(diff) }
    }
}

/// Outcome of a review transition.
#[derive(Debug, Clone)]
pub struct AllocationTransition {
    /// The request after the transition.
    pub request: AllocationRequest,
    /// The ledger delta the transition carries (zero for most edges).
    pub delta: LedgerDelta,
}

/// Stateless service for allocation request transitions.
///
/// All methods validate against the current status and return the updated
/// request value; persistence is the caller's concern.
pub struct AllocationWorkflow;

impl AllocationWorkflow {
    /// Validates create/edit fields.
    fn validate_fields(fields: &AllocationFields) -> Result<(), WorkflowError> {
        if fields.requested_amount <= Decimal::ZERO {
            return Err(WorkflowError::Validation(
                "requested_amount must be positive".to_string(),
            ));
        }
        if fields.justification.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "justification must not be empty".to_string(),
            ));
        }
        for item in &fields.budget_breakdown {
            if item.category.trim().is_empty() {
                return Err(WorkflowError::Validation(
                    "breakdown category must not be empty".to_string(),
                ));
            }
            if item.description.trim().is_empty() {
                return Err(WorkflowError::Validation(
                    "breakdown description must not be empty".to_string(),
                ));
            }
            if item.amount < Decimal::ZERO {
                return Err(WorkflowError::Validation(
                    "breakdown amounts must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Creates a new draft request.
    pub fn create(input: NewAllocationRequest) -> Result<AllocationRequest, WorkflowError> {
        Self::validate_fields(&input.fields)?;

        Ok(AllocationRequest {
            id: RequestId::new(),
            organization_id: input.organization_id,
            fiscal_year_id: input.fiscal_year_id,
            ministry_id: input.ministry_id,
            requester_id: input.requester_id,
            period: input.fields.period,
            requested_amount: input.fields.requested_amount,
            approved_amount: None,
            justification: input.fields.justification,
            budget_breakdown: input.fields.budget_breakdown,
            status: AllocationStatus::Draft,
            version: 1,
            created_at: Utc::now(),
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            review_notes: None,
        })
    }

    /// Edits a draft in place (new version).
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the request is in draft.
    pub fn edit(
        request: &AllocationRequest,
        fields: AllocationFields,
    ) -> Result<AllocationRequest, WorkflowError> {
        if !request.status.is_editable() {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action: "edit",
            });
        }
        Self::validate_fields(&fields)?;

        let mut next = request.clone();
        next.period = fields.period;
        next.requested_amount = fields.requested_amount;
        next.justification = fields.justification;
        next.budget_breakdown = fields.budget_breakdown;
        next.version += 1;
        Ok(next)
    }

    /// Submits a draft for review.
    pub fn submit(request: &AllocationRequest) -> Result<AllocationRequest, WorkflowError> {
        if request.status != AllocationStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action: "submit",
            });
        }

        let mut next = request.clone();
        next.status = AllocationStatus::Submitted;
        next.submitted_at = Some(Utc::now());
        next.version += 1;
        Ok(next)
    }

    /// Reviews a submitted request.
    ///
    /// Approval grants `approved_amount` (positive, <= requested) and
    /// carries the `allocated += approved_amount` ledger delta; rejection
    /// requires notes and does not move the ledger.
    pub fn review(
        request: &AllocationRequest,
        reviewer: UserId,
        decision: &ReviewDecision,
        notes: Option<String>,
    ) -> Result<AllocationTransition, WorkflowError> {
        if request.status != AllocationStatus::Submitted {
            let action = match decision {
                ReviewDecision::Approve { .. } => "approve",
                ReviewDecision::Reject => "reject",
            };
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action,
            });
        }

        let mut next = request.clone();
        next.reviewed_at = Some(Utc::now());
        next.reviewed_by = Some(reviewer);
        next.version += 1;

        let delta = match decision {
            ReviewDecision::Approve { approved_amount } => {
                if *approved_amount <= Decimal::ZERO {
                    return Err(WorkflowError::Validation(
                        "approved_amount must be positive".to_string(),
                    ));
                }
                if *approved_amount > request.requested_amount {
                    return Err(WorkflowError::Validation(format!(
                        "approved_amount {approved_amount} exceeds requested amount {}",
                        request.requested_amount
                    )));
                }
                next.status = AllocationStatus::Approved;
                next.approved_amount = Some(*approved_amount);
                next.review_notes = notes;
                LedgerDelta::allocate(*approved_amount)
            }
            ReviewDecision::Reject => {
                let notes = notes.unwrap_or_default();
                if notes.trim().is_empty() {
                    return Err(WorkflowError::Validation(
                        "rejection notes are required".to_string(),
                    ));
                }
                next.status = AllocationStatus::Rejected;
                next.review_notes = Some(notes);
                LedgerDelta::ZERO
            }
        };

        Ok(AllocationTransition {
            request: next,
            delta,
        })
    }

    /// Checks that a request may be discarded (drafts only; drafts never
    /// touch the ledger, so discarding has no ledger effect).
    pub fn check_discard(request: &AllocationRequest) -> Result<(), WorkflowError> {
        if request.status != AllocationStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action: "discard",
            });
        }
        Ok(())
    }
}
