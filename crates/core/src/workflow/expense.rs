//! Expense request lifecycle.
//!
//! Expenses walk a multi-stage approval chain:
//!
//! ```text
//! draft → pending_leader → pending_treasury → pending_finance → treasury_approved
//!              │                  │
//!              │                  └→ treasury_denied
//!              ├→ leader_denied
//!              └→ leader_approved        (small amounts, see threshold)
//! ```
//!
//! The ledger holds the amount as pending from the moment the request
//! enters the chain and resolves it exactly once at the terminal edge:
//! settled to spent on approval, released on denial. Intermediate
//! forward moves carry a zero delta.

use chrono::{DateTime, Utc};
use fiscus_shared::types::{FiscalYearId, MinistryId, OrganizationId, RequestId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fiscal::Period;
use crate::ledger::{LedgerDelta, LedgerKey};
use crate::workflow::error::WorkflowError;
use crate::workflow::policy::{ApprovalStage, Role};

/// Expense request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Being drafted; not yet in the approval chain.
    Draft,
    /// Awaiting the ministry leader.
    PendingLeader,
    /// Awaiting the treasury officer.
    PendingTreasury,
    /// Awaiting the finance officer's final confirmation.
    PendingFinance,
    /// Approved at the leader stage without escalation (terminal).
    LeaderApproved,
    /// Fully approved through the chain (terminal).
    TreasuryApproved,
    /// Denied by the ministry leader (terminal).
    LeaderDenied,
    /// Denied by the treasury officer (terminal).
    TreasuryDenied,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingLeader => "pending_leader",
            Self::PendingTreasury => "pending_treasury",
            Self::PendingFinance => "pending_finance",
            Self::LeaderApproved => "leader_approved",
            Self::TreasuryApproved => "treasury_approved",
            Self::LeaderDenied => "leader_denied",
            Self::TreasuryDenied => "treasury_denied",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_leader" => Some(Self::PendingLeader),
            "pending_treasury" => Some(Self::PendingTreasury),
            "pending_finance" => Some(Self::PendingFinance),
            "leader_approved" => Some(Self::LeaderApproved),
            "treasury_approved" => Some(Self::TreasuryApproved),
            "leader_denied" => Some(Self::LeaderDenied),
            "treasury_denied" => Some(Self::TreasuryDenied),
            _ => None,
        }
    }

    /// The approval stage this status is waiting on, if any.
    #[must_use]
    pub fn stage(&self) -> Option<ApprovalStage> {
        match self {
            Self::PendingLeader => Some(ApprovalStage::Leader),
            Self::PendingTreasury => Some(ApprovalStage::Treasury),
            Self::PendingFinance => Some(ApprovalStage::Finance),
            _ => None,
        }
    }

    /// Returns true if the expense counts as approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::LeaderApproved | Self::TreasuryApproved)
    }

    /// Returns true if the status has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::LeaderApproved | Self::TreasuryApproved | Self::LeaderDenied | Self::TreasuryDenied
        )
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an approver does at a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseAction {
    /// Move the request forward (or finish it).
    Approve,
    /// Stop the request; notes required.
    Deny,
}

impl ExpenseAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
        }
    }
}

/// One recorded stage decision on an expense request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDecision {
    /// The stage the decision was made at.
    pub stage: ApprovalStage,
    /// The deciding user.
    pub decided_by: UserId,
    /// The role the user acted under.
    pub role: Role,
    /// True for approve, false for deny.
    pub approved: bool,
    /// Decision notes (always present on denials).
    pub notes: Option<String>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

/// Input for creating an expense request.
#[derive(Debug, Clone)]
pub struct NewExpenseRequest {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Fiscal year the expense charges against.
    pub fiscal_year_id: FiscalYearId,
    /// Ministry whose budget the expense charges.
    pub ministry_id: MinistryId,
    /// The requesting user.
    pub requester_id: UserId,
    /// Budget period the expense charges against.
    pub period: Period,
    /// Expense amount (positive).
    pub amount: Decimal,
    /// Spending category.
    pub category: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// An expense request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Fiscal year the expense charges against.
    pub fiscal_year_id: FiscalYearId,
    /// Ministry whose budget the expense charges.
    pub ministry_id: MinistryId,
    /// The requesting user.
    pub requester_id: UserId,
    /// Budget period the expense charges against.
    pub period: Period,
    /// Expense amount (positive).
    pub amount: Decimal,
    /// Spending category.
    pub category: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Current status.
    pub status: ExpenseStatus,
    /// Ordered trail of stage decisions.
    pub decisions: Vec<StageDecision>,
    /// Monotonically increasing version for optimistic concurrency.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the request entered the approval chain.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ExpenseRequest {
    /// The ledger row this request charges against.
    #[must_use]
    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey {
            organization_id: self.organization_id,
            fiscal_year_id: self.fiscal_year_id,
            ministry_id: self.ministry_id,
            period: self.period,
        }
    }
}

/// Outcome of an expense transition: the updated request plus the ledger
/// delta the edge carries.
#[derive(Debug, Clone)]
pub struct ExpenseTransition {
    /// The request after the transition.
    pub request: ExpenseRequest,
    /// The ledger delta for this edge (zero for intermediate moves).
    pub delta: LedgerDelta,
}

/// Stateless service for expense request transitions.
pub struct ExpenseWorkflow;

impl ExpenseWorkflow {
    fn validate_new(input: &NewExpenseRequest) -> Result<(), WorkflowError> {
        if input.amount <= Decimal::ZERO {
            return Err(WorkflowError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        if input.category.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "category must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates a new expense request.
    ///
    /// With `submit` the request enters the chain at `pending_leader`
    /// immediately and the transition carries the pending hold; otherwise
    /// it starts as a draft with a zero delta.
    pub fn create(
        input: NewExpenseRequest,
        submit: bool,
    ) -> Result<ExpenseTransition, WorkflowError> {
        Self::validate_new(&input)?;

        let now = Utc::now();
        let (status, submitted_at, delta) = if submit {
            (
                ExpenseStatus::PendingLeader,
                Some(now),
                LedgerDelta::hold(input.amount),
            )
        } else {
            (ExpenseStatus::Draft, None, LedgerDelta::ZERO)
        };

        Ok(ExpenseTransition {
            request: ExpenseRequest {
                id: RequestId::new(),
                organization_id: input.organization_id,
                fiscal_year_id: input.fiscal_year_id,
                ministry_id: input.ministry_id,
                requester_id: input.requester_id,
                period: input.period,
                amount: input.amount,
                category: input.category,
                description: input.description,
                status,
                decisions: Vec::new(),
                version: 1,
                created_at: now,
                submitted_at,
            },
            delta,
        })
    }

    /// Submits a draft into the approval chain.
    ///
    /// Carries the pending hold for the full amount; this is the only
    /// edge that holds, so the hold happens exactly once per lifecycle.
    pub fn submit(request: &ExpenseRequest) -> Result<ExpenseTransition, WorkflowError> {
        if request.status != ExpenseStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action: "submit",
            });
        }

        let mut next = request.clone();
        next.status = ExpenseStatus::PendingLeader;
        next.submitted_at = Some(Utc::now());
        next.version += 1;

        Ok(ExpenseTransition {
            request: next,
            delta: LedgerDelta::hold(request.amount),
        })
    }

    /// Applies a stage decision to a pending request.
    ///
    /// Denials require notes and release the pending hold. Approval at
    /// the leader stage finishes small requests directly when the amount
    /// is at or under `leader_final_threshold`; otherwise it escalates.
    /// The finance stage confirms only - there is no deny edge there.
    pub fn advance(
        request: &ExpenseRequest,
        decided_by: UserId,
        role: Role,
        action: ExpenseAction,
        notes: Option<String>,
        leader_final_threshold: Option<Decimal>,
    ) -> Result<ExpenseTransition, WorkflowError> {
        let Some(stage) = request.status.stage() else {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action: action.as_str(),
            });
        };

        let (status, delta) = match (stage, action) {
            (ApprovalStage::Leader, ExpenseAction::Approve) => {
                let final_here = leader_final_threshold
                    .is_some_and(|threshold| request.amount <= threshold);
                if final_here {
                    (
                        ExpenseStatus::LeaderApproved,
                        LedgerDelta::settle(request.amount),
                    )
                } else {
                    (ExpenseStatus::PendingTreasury, LedgerDelta::ZERO)
                }
            }
            (ApprovalStage::Treasury, ExpenseAction::Approve) => {
                (ExpenseStatus::PendingFinance, LedgerDelta::ZERO)
            }
            (ApprovalStage::Finance, ExpenseAction::Approve) => (
                ExpenseStatus::TreasuryApproved,
                LedgerDelta::settle(request.amount),
            ),
            (ApprovalStage::Leader, ExpenseAction::Deny) => (
                ExpenseStatus::LeaderDenied,
                LedgerDelta::release(request.amount),
            ),
            (ApprovalStage::Treasury, ExpenseAction::Deny) => (
                ExpenseStatus::TreasuryDenied,
                LedgerDelta::release(request.amount),
            ),
            // Finance confirms treasury's decision; it cannot reverse it.
            (ApprovalStage::Finance, ExpenseAction::Deny) => {
                return Err(WorkflowError::InvalidTransition {
                    from: request.status.as_str(),
                    action: "deny",
                });
            }
        };

        if action == ExpenseAction::Deny
            && notes.as_deref().is_none_or(|n| n.trim().is_empty())
        {
            return Err(WorkflowError::Validation(
                "denial notes are required".to_string(),
            ));
        }

        let mut next = request.clone();
        next.status = status;
        next.decisions.push(StageDecision {
            stage,
            decided_by,
            role,
            approved: action == ExpenseAction::Approve,
            notes,
            decided_at: Utc::now(),
        });
        next.version += 1;

        Ok(ExpenseTransition {
            request: next,
            delta,
        })
    }

    /// Checks that a request may be discarded (drafts only; drafts hold
    /// nothing, so discarding has no ledger effect).
    pub fn check_discard(request: &ExpenseRequest) -> Result<(), WorkflowError> {
        if request.status != ExpenseStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: request.status.as_str(),
                action: "discard",
            });
        }
        Ok(())
    }
}
