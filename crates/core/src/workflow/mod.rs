//! Request workflow state machines and access policy.
//!
//! Everything here is pure: services take the current request value and
//! return the next one (plus the ledger delta the edge carries). Stores
//! persist; these modules decide.

pub mod allocation;
pub mod error;
pub mod expense;
pub mod policy;

#[cfg(test)]
mod allocation_props;
#[cfg(test)]
mod expense_props;

pub use allocation::{
    AllocationFields, AllocationRequest, AllocationStatus, AllocationTransition,
    AllocationWorkflow, BreakdownItem, NewAllocationRequest, ReviewDecision,
};
pub use error::WorkflowError;
pub use expense::{
    ExpenseAction, ExpenseRequest, ExpenseStatus, ExpenseTransition, ExpenseWorkflow,
    NewExpenseRequest, StageDecision,
};
pub use policy::{AccessPolicy, Action, ApprovalStage, Actor, Role};
