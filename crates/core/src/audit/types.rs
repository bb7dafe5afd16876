//! Audit entry types.
//!
//! Every successful state change on a request appends exactly one entry.
//! Entries are never updated or deleted; the trail is the source of truth
//! a request's status field is a projection of.

use chrono::{DateTime, Utc};
use fiscus_shared::types::{RequestId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflow::policy::Role;

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The request was created.
    Create,
    /// A draft was edited.
    Update,
    /// The request entered review or the approval chain.
    Submit,
    /// An approval decision (stage or final).
    Approve,
    /// An allocation request was rejected.
    Reject,
    /// An expense request was denied at a stage.
    Deny,
    /// A draft was discarded.
    Discard,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Deny => "deny",
            Self::Discard => "discard",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The request the entry is about.
    pub request_id: RequestId,
    /// Who acted.
    pub actor_id: UserId,
    /// The role the actor held at decision time.
    pub actor_role: Role,
    /// What happened.
    pub action: AuditAction,
    /// Status before the change (`None` on create).
    pub prior_status: Option<String>,
    /// Status after the change.
    pub new_status: String,
    /// When it happened.
    pub recorded_at: DateTime<Utc>,
    /// Free-text notes attached to the action.
    pub notes: Option<String>,
}

impl AuditEntry {
    /// Builds an entry timestamped now.
    #[must_use]
    pub fn record(
        request_id: RequestId,
        actor_id: UserId,
        actor_role: Role,
        action: AuditAction,
        prior_status: Option<&str>,
        new_status: &str,
        notes: Option<String>,
    ) -> Self {
        Self {
            request_id,
            actor_id,
            actor_role,
            action,
            prior_status: prior_status.map(str::to_string),
            new_status: new_status.to_string(),
            recorded_at: Utc::now(),
            notes,
        }
    }
}
