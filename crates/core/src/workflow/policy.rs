//! Role capability table and stage ownership checks.
//!
//! Role-based branching is expressed as a static (role, action) table plus
//! stage-owner rules, all pure functions so they can be exhaustively tested.

use fiscus_shared::types::{MinistryId, OrganizationId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflow::error::WorkflowError;

/// Role an actor holds within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates and submits requests for their ministry.
    Requester,
    /// First-stage expense approver, scoped to their own ministry.
    MinistryLeader,
    /// Second-stage expense approver.
    TreasuryOfficer,
    /// Final expense approver and allocation reviewer.
    FinanceOfficer,
    /// Bypasses stage and ministry checks, never organization membership.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::MinistryLeader => "ministry_leader",
            Self::TreasuryOfficer => "treasury_officer",
            Self::FinanceOfficer => "finance_officer",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "requester" => Some(Self::Requester),
            "ministry_leader" => Some(Self::MinistryLeader),
            "treasury_officer" => Some(Self::TreasuryOfficer),
            "finance_officer" => Some(Self::FinanceOfficer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action an actor may attempt against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create or modify a draft.
    Edit,
    /// Submit a draft for review.
    Submit,
    /// Review a submitted allocation request (approve or reject).
    Review,
    /// Approve an expense at a pending stage.
    Approve,
    /// Deny an expense at a pending stage.
    Deny,
    /// Discard a draft.
    Discard,
}

impl Action {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Submit => "submit",
            Self::Review => "review",
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::Discard => "discard",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pending stage of an expense request, used for stage ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStage {
    /// Ministry leader review.
    Leader,
    /// Treasury officer review.
    Treasury,
    /// Finance officer completion.
    Finance,
}

impl ApprovalStage {
    /// Returns the role that owns this stage.
    #[must_use]
    pub const fn owner(&self) -> Role {
        match self {
            Self::Leader => Role::MinistryLeader,
            Self::Treasury => Role::TreasuryOfficer,
            Self::Finance => Role::FinanceOfficer,
        }
    }
}

/// An authenticated actor as supplied by the identity provider.
///
/// The engine trusts these fields; it never derives them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user.
    pub user_id: UserId,
    /// The organization the actor is operating in.
    pub organization_id: OrganizationId,
    /// The actor's role within the organization.
    pub role: Role,
    /// The ministry the actor belongs to, if any. Required for ministry
    /// leaders acting at the leader stage.
    pub ministry_id: Option<MinistryId>,
}

/// Static capability table: (role, action) → permitted.
pub struct AccessPolicy;

impl AccessPolicy {
    /// Returns true if the role is granted the action at all.
    ///
    /// Stage and ministry scoping are layered on top by
    /// [`AccessPolicy::check_expense_stage`].
    #[must_use]
    pub const fn allows(role: Role, action: Action) -> bool {
        match role {
            Role::Requester => matches!(action, Action::Edit | Action::Submit | Action::Discard),
            Role::MinistryLeader => matches!(
                action,
                Action::Edit | Action::Submit | Action::Discard | Action::Approve | Action::Deny
            ),
            Role::TreasuryOfficer => matches!(action, Action::Approve | Action::Deny),
            Role::FinanceOfficer => matches!(action, Action::Approve | Action::Review),
            Role::Admin => true,
        }
    }

    /// Checks that an actor may act at an expense pending stage.
    ///
    /// Admin bypasses the stage and ministry checks. A ministry leader may
    /// only act on expenses of their own ministry, even when the role
    /// matches the stage owner.
    pub fn check_expense_stage(
        actor: &Actor,
        action: Action,
        stage: ApprovalStage,
        ministry_id: MinistryId,
    ) -> Result<(), WorkflowError> {
        if actor.role == Role::Admin {
            return Ok(());
        }

        if !Self::allows(actor.role, action) || actor.role != stage.owner() {
            return Err(WorkflowError::PermissionDenied);
        }

        if stage == ApprovalStage::Leader && actor.ministry_id != Some(ministry_id) {
            return Err(WorkflowError::PermissionDenied);
        }

        Ok(())
    }

    /// Checks that an actor may review a submitted allocation request.
    pub fn check_allocation_review(actor: &Actor) -> Result<(), WorkflowError> {
        if actor.role == Role::Admin || Self::allows(actor.role, Action::Review) {
            Ok(())
        } else {
            Err(WorkflowError::PermissionDenied)
        }
    }

    /// Checks that an actor may create, edit, submit, or discard a request
    /// owned by `requester_id`.
    ///
    /// Only the owning requester (or an admin) may mutate a draft.
    pub fn check_requester_mutation(
        actor: &Actor,
        action: Action,
        requester_id: UserId,
    ) -> Result<(), WorkflowError> {
        if actor.role == Role::Admin {
            return Ok(());
        }

        if !Self::allows(actor.role, action) || actor.user_id != requester_id {
            return Err(WorkflowError::PermissionDenied);
        }

        Ok(())
    }
}
