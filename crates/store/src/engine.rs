//! The workflow engine: policy checks, state transitions, and the
//! three-way commit across request, ledger, and audit stores.
//!
//! Every operation follows the same shape: fetch, check the supplied
//! version, check policy, run the pure transition from `fiscus-core`,
//! then commit. Preconditions are checked in a fixed order so the error
//! a caller sees is deterministic: not-found, then conflict, then
//! permission, then transition legality, then payload validation.
//!
//! The commit writes the request first (a CAS on the version), then the
//! ledger, then the audit trail. A failure after the first write rolls
//! the earlier writes back: ledger failure restores the prior request,
//! audit failure additionally applies the inverse ledger delta. The
//! engine never leaves a half-committed transition behind on a clean
//! rollback; a rollback failure itself is logged as data inconsistency.

use tracing::{error, info, warn};

use fiscus_core::audit::{AuditAction, AuditEntry};
use fiscus_core::ledger::{BudgetSummary, LedgerDelta, LedgerKey, LedgerService};
use fiscus_core::workflow::{
    AccessPolicy, Action, AllocationFields, AllocationRequest, AllocationWorkflow, Actor,
    ExpenseAction, ExpenseRequest, ExpenseWorkflow, NewAllocationRequest, NewExpenseRequest,
    ReviewDecision, WorkflowError,
};
use fiscus_shared::types::{FiscalYearId, RequestId};
use fiscus_shared::WorkflowConfig;

use crate::memory::{MemoryAuditStore, MemoryLedgerStore, MemoryRequestStore};
use crate::traits::{AuditStore, LedgerStore, RequestStore, StoredRequest};

/// The workflow engine, generic over its three stores.
pub struct WorkflowEngine<R, L, A> {
    requests: R,
    ledger: L,
    audit: A,
    config: WorkflowConfig,
}

impl WorkflowEngine<MemoryRequestStore, MemoryLedgerStore, MemoryAuditStore> {
    /// Creates an engine over fresh in-memory stores.
    #[must_use]
    pub fn in_memory(config: WorkflowConfig) -> Self {
        Self::new(
            MemoryRequestStore::new(),
            MemoryLedgerStore::new(),
            MemoryAuditStore::new(),
            config,
        )
    }
}

impl<R, L, A> WorkflowEngine<R, L, A>
where
    R: RequestStore,
    L: LedgerStore,
    A: AuditStore,
{
    /// Creates an engine over the given stores.
    pub fn new(requests: R, ledger: L, audit: A, config: WorkflowConfig) -> Self {
        Self {
            requests,
            ledger,
            audit,
            config,
        }
    }

    // ---- allocation requests ----

    /// Creates an allocation request draft.
    pub fn create_allocation_request(
        &self,
        actor: &Actor,
        input: NewAllocationRequest,
    ) -> Result<AllocationRequest, WorkflowError> {
        Self::check_scope(input.organization_id == actor.organization_id)?;
        AccessPolicy::check_requester_mutation(actor, Action::Edit, input.requester_id)?;

        let request = AllocationWorkflow::create(input)?;
        let entry = AuditEntry::record(
            request.id,
            actor.user_id,
            actor.role,
            AuditAction::Create,
            None,
            request.status.as_str(),
            None,
        );
        self.commit_create(request.clone().into(), LedgerDelta::ZERO, request.ledger_key(), entry)?;

        info!(request_id = %request.id, "allocation request created");
        Ok(request)
    }

    /// Edits an allocation draft in place.
    pub fn update_allocation_request(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
        fields: AllocationFields,
    ) -> Result<AllocationRequest, WorkflowError> {
        let request = self.fetch_allocation(actor, id)?;
        Self::check_version(expected_version, request.version)?;
        AccessPolicy::check_requester_mutation(actor, Action::Edit, request.requester_id)?;

        let next = AllocationWorkflow::edit(&request, fields)?;
        let entry = AuditEntry::record(
            id,
            actor.user_id,
            actor.role,
            AuditAction::Update,
            Some(request.status.as_str()),
            next.status.as_str(),
            None,
        );
        self.commit_transition(
            request.into(),
            next.clone().into(),
            LedgerDelta::ZERO,
            next.ledger_key(),
            entry,
        )?;

        info!(request_id = %id, version = next.version, "allocation request updated");
        Ok(next)
    }

    /// Submits an allocation draft for review.
    pub fn submit_allocation_request(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
    ) -> Result<AllocationRequest, WorkflowError> {
        let request = self.fetch_allocation(actor, id)?;
        Self::check_version(expected_version, request.version)?;
        AccessPolicy::check_requester_mutation(actor, Action::Submit, request.requester_id)?;

        let next = AllocationWorkflow::submit(&request)?;
        if let Some(variance) = next.breakdown_variance() {
            // Submitted anyway; reviewers see the mismatch.
            warn!(
                request_id = %id,
                %variance,
                "breakdown total differs from requested amount"
            );
        }

        let entry = AuditEntry::record(
            id,
            actor.user_id,
            actor.role,
            AuditAction::Submit,
            Some(request.status.as_str()),
            next.status.as_str(),
            None,
        );
        self.commit_transition(
            request.into(),
            next.clone().into(),
            LedgerDelta::ZERO,
            next.ledger_key(),
            entry,
        )?;

        info!(request_id = %id, "allocation request submitted");
        Ok(next)
    }

    /// Reviews a submitted allocation request. Approval credits the
    /// ledger's allocated counter with the granted amount.
    pub fn review_allocation_request(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
        decision: &ReviewDecision,
        notes: Option<String>,
    ) -> Result<AllocationRequest, WorkflowError> {
        let request = self.fetch_allocation(actor, id)?;
        Self::check_version(expected_version, request.version)?;
        AccessPolicy::check_allocation_review(actor)?;

        let transition = AllocationWorkflow::review(&request, actor.user_id, decision, notes)?;
        let next = transition.request;
        let action = match decision {
            ReviewDecision::Approve { .. } => AuditAction::Approve,
            ReviewDecision::Reject => AuditAction::Reject,
        };
        let entry = AuditEntry::record(
            id,
            actor.user_id,
            actor.role,
            action,
            Some(request.status.as_str()),
            next.status.as_str(),
            next.review_notes.clone(),
        );
        self.commit_transition(
            request.into(),
            next.clone().into(),
            transition.delta,
            next.ledger_key(),
            entry,
        )?;

        info!(
            request_id = %id,
            status = next.status.as_str(),
            "allocation request reviewed"
        );
        Ok(next)
    }

    /// Discards an allocation draft. Drafts never touched the ledger, so
    /// only the request and audit stores are involved.
    pub fn discard_allocation_draft(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
    ) -> Result<(), WorkflowError> {
        let request = self.fetch_allocation(actor, id)?;
        Self::check_version(expected_version, request.version)?;
        AccessPolicy::check_requester_mutation(actor, Action::Discard, request.requester_id)?;
        AllocationWorkflow::check_discard(&request)?;

        self.commit_discard(request.into(), actor)?;
        info!(request_id = %id, "allocation draft discarded");
        Ok(())
    }

    // ---- expense requests ----

    /// Creates an expense request, optionally submitting it into the
    /// approval chain in the same operation. Direct submission holds the
    /// amount as pending immediately.
    pub fn create_expense_request(
        &self,
        actor: &Actor,
        input: NewExpenseRequest,
        submit: bool,
    ) -> Result<ExpenseRequest, WorkflowError> {
        Self::check_scope(input.organization_id == actor.organization_id)?;
        let action = if submit { Action::Submit } else { Action::Edit };
        AccessPolicy::check_requester_mutation(actor, action, input.requester_id)?;

        let transition = ExpenseWorkflow::create(input, submit)?;
        let request = transition.request;
        let entry = AuditEntry::record(
            request.id,
            actor.user_id,
            actor.role,
            AuditAction::Create,
            None,
            request.status.as_str(),
            None,
        );
        self.commit_create(
            request.clone().into(),
            transition.delta,
            request.ledger_key(),
            entry,
        )?;

        info!(
            request_id = %request.id,
            status = request.status.as_str(),
            "expense request created"
        );
        Ok(request)
    }

    /// Submits an expense draft into the approval chain, holding the
    /// amount as pending.
    pub fn submit_expense_request(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
    ) -> Result<ExpenseRequest, WorkflowError> {
        let request = self.fetch_expense(actor, id)?;
        Self::check_version(expected_version, request.version)?;
        AccessPolicy::check_requester_mutation(actor, Action::Submit, request.requester_id)?;

        let transition = ExpenseWorkflow::submit(&request)?;
        let next = transition.request;
        let entry = AuditEntry::record(
            id,
            actor.user_id,
            actor.role,
            AuditAction::Submit,
            Some(request.status.as_str()),
            next.status.as_str(),
            None,
        );
        self.commit_transition(
            request.into(),
            next.clone().into(),
            transition.delta,
            next.ledger_key(),
            entry,
        )?;

        info!(request_id = %id, "expense request submitted");
        Ok(next)
    }

    /// Applies a stage decision to a pending expense request.
    pub fn advance_expense_request(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
        action: ExpenseAction,
        notes: Option<String>,
    ) -> Result<ExpenseRequest, WorkflowError> {
        let request = self.fetch_expense(actor, id)?;
        Self::check_version(expected_version, request.version)?;

        // Terminal and draft statuses have no stage; skip the policy
        // check and let the transition report the illegal edge.
        if let Some(stage) = request.status.stage() {
            let policy_action = match action {
                ExpenseAction::Approve => Action::Approve,
                ExpenseAction::Deny => Action::Deny,
            };
            AccessPolicy::check_expense_stage(actor, policy_action, stage, request.ministry_id)?;
        }

        let transition = ExpenseWorkflow::advance(
            &request,
            actor.user_id,
            actor.role,
            action,
            notes.clone(),
            self.config.leader_final_threshold,
        )?;
        let next = transition.request;
        let audit_action = match action {
            ExpenseAction::Approve => AuditAction::Approve,
            ExpenseAction::Deny => AuditAction::Deny,
        };
        let entry = AuditEntry::record(
            id,
            actor.user_id,
            actor.role,
            audit_action,
            Some(request.status.as_str()),
            next.status.as_str(),
            notes,
        );
        self.commit_transition(
            request.into(),
            next.clone().into(),
            transition.delta,
            next.ledger_key(),
            entry,
        )?;

        info!(
            request_id = %id,
            status = next.status.as_str(),
            "expense request advanced"
        );
        Ok(next)
    }

    /// Discards an expense draft.
    pub fn discard_expense_draft(
        &self,
        actor: &Actor,
        id: RequestId,
        expected_version: i64,
    ) -> Result<(), WorkflowError> {
        let request = self.fetch_expense(actor, id)?;
        Self::check_version(expected_version, request.version)?;
        AccessPolicy::check_requester_mutation(actor, Action::Discard, request.requester_id)?;
        ExpenseWorkflow::check_discard(&request)?;

        self.commit_discard(request.into(), actor)?;
        info!(request_id = %id, "expense draft discarded");
        Ok(())
    }

    // ---- reads ----

    /// Organization-wide budget summary for one fiscal year, aggregated
    /// per ministry from committed ledger rows.
    pub fn budget_summary(
        &self,
        actor: &Actor,
        fiscal_year_id: FiscalYearId,
    ) -> Result<BudgetSummary, WorkflowError> {
        let rows = self.ledger.entries(actor.organization_id, fiscal_year_id)?;
        Ok(LedgerService::summarize(
            actor.organization_id,
            fiscal_year_id,
            rows,
        ))
    }

    /// A request's audit trail in append order. Scoped like every fetch:
    /// requests of other organizations read as not found.
    pub fn history(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<Vec<AuditEntry>, WorkflowError> {
        // Scope check only; either kind of request works.
        let stored = self
            .requests
            .get(id)
            .map_err(WorkflowError::from)?
            .filter(|stored| stored.organization_id() == actor.organization_id)
            .ok_or(WorkflowError::NotFound(id))?;
        Ok(self.audit.history(stored.id())?)
    }

    // ---- internals ----

    const fn check_scope(in_scope: bool) -> Result<(), WorkflowError> {
        if in_scope {
            Ok(())
        } else {
            Err(WorkflowError::PermissionDenied)
        }
    }

    const fn check_version(supplied: i64, current: i64) -> Result<(), WorkflowError> {
        if supplied == current {
            Ok(())
        } else {
            Err(WorkflowError::Conflict { supplied, current })
        }
    }

    fn fetch_allocation(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<AllocationRequest, WorkflowError> {
        match self.requests.get(id).map_err(WorkflowError::from)? {
            Some(StoredRequest::Allocation(request))
                if request.organization_id == actor.organization_id =>
            {
                Ok(request)
            }
            // Absent, wrong kind, and wrong organization all read the same.
            _ => Err(WorkflowError::NotFound(id)),
        }
    }

    fn fetch_expense(&self, actor: &Actor, id: RequestId) -> Result<ExpenseRequest, WorkflowError> {
        match self.requests.get(id).map_err(WorkflowError::from)? {
            Some(StoredRequest::Expense(request))
                if request.organization_id == actor.organization_id =>
            {
                Ok(request)
            }
            _ => Err(WorkflowError::NotFound(id)),
        }
    }

    /// Commits a brand-new request: insert, then ledger, then audit.
    /// Later failures remove the inserted request again.
    fn commit_create(
        &self,
        next: StoredRequest,
        delta: LedgerDelta,
        key: LedgerKey,
        entry: AuditEntry,
    ) -> Result<(), WorkflowError> {
        let id = next.id();
        self.requests.insert(next)?;

        if !delta.is_zero() {
            if let Err(err) = self.ledger.adjust(key, delta) {
                error!(request_id = %id, error = %err, "ledger adjust failed, removing request");
                self.rollback_insert(id);
                return Err(err.into());
            }
        }

        if let Err(err) = self.audit.append(entry) {
            error!(request_id = %id, error = %err, "audit append failed, compensating");
            if !delta.is_zero() {
                self.rollback_ledger(key, delta);
            }
            self.rollback_insert(id);
            return Err(err.into());
        }

        Ok(())
    }

    /// Commits a transition on an existing request: CAS the request,
    /// then ledger, then audit, compensating backwards on failure.
    fn commit_transition(
        &self,
        prior: StoredRequest,
        next: StoredRequest,
        delta: LedgerDelta,
        key: LedgerKey,
        entry: AuditEntry,
    ) -> Result<(), WorkflowError> {
        let id = prior.id();
        self.requests.update(prior.version(), next)?;

        if !delta.is_zero() {
            if let Err(err) = self.ledger.adjust(key, delta) {
                error!(request_id = %id, error = %err, "ledger adjust failed, restoring request");
                self.rollback_request(prior);
                return Err(err.into());
            }
        }

        if let Err(err) = self.audit.append(entry) {
            error!(request_id = %id, error = %err, "audit append failed, compensating");
            if !delta.is_zero() {
                self.rollback_ledger(key, delta);
            }
            self.rollback_request(prior);
            return Err(err.into());
        }

        Ok(())
    }

    /// Removes a draft and records the discard; the draft is restored if
    /// the audit append fails.
    fn commit_discard(&self, prior: StoredRequest, actor: &Actor) -> Result<(), WorkflowError> {
        let id = prior.id();
        let entry = AuditEntry::record(
            id,
            actor.user_id,
            actor.role,
            AuditAction::Discard,
            Some(prior.status_str()),
            "discarded",
            None,
        );

        self.requests.remove(id)?;
        if let Err(err) = self.audit.append(entry) {
            error!(request_id = %id, error = %err, "audit append failed, restoring draft");
            self.rollback_request(prior);
            return Err(err.into());
        }
        Ok(())
    }

    fn rollback_insert(&self, id: RequestId) {
        if let Err(err) = self.requests.remove(id) {
            error!(request_id = %id, error = %err, "rollback remove failed; request store inconsistent");
        }
    }

    fn rollback_request(&self, prior: StoredRequest) {
        let id = prior.id();
        if let Err(err) = self.requests.restore(prior) {
            error!(request_id = %id, error = %err, "rollback restore failed; request store inconsistent");
        }
    }

    /// Applies the inverse of a delta that was just applied. The inverse
    /// of a successful adjustment cannot underflow unless a concurrent
    /// writer interfered, which is logged as inconsistency.
    fn rollback_ledger(&self, key: LedgerKey, delta: LedgerDelta) {
        if let Err(err) = self.ledger.adjust(key, delta.inverse()) {
            error!(error = %err, "rollback adjust failed; ledger inconsistent");
        }
    }
}
