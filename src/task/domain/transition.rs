//! Lifecycle transition table for root task statuses.
//!
//! The table is a pure lookup from `(current status, action)` to the target
//! status and the role the actor must hold. Keeping it a standalone function
//! makes the full edge set testable without constructing tasks.

use super::{StatusAction, TaskStatus};
use crate::project::domain::RequiredRole;

/// A permitted edge in the task lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status the task moves to when the edge is taken.
    pub to: TaskStatus,
    /// Minimum role the actor must hold to take the edge.
    pub required_role: RequiredRole,
}

const fn edge(to: TaskStatus, required_role: RequiredRole) -> Option<Transition> {
    Some(Transition { to, required_role })
}

/// Returns the lifecycle edge for `(from, action)`.
///
/// `None` means the action is not valid from the given status and must be
/// rejected as an illegal transition.
#[must_use]
pub const fn transition_for(from: TaskStatus, action: StatusAction) -> Option<Transition> {
    match (from, action) {
        (TaskStatus::PendingApproval, StatusAction::Approve) => {
            edge(TaskStatus::ToDo, RequiredRole::Creator)
        }
        (TaskStatus::ToDo, StatusAction::MoveToInProgress) => {
            edge(TaskStatus::InProgress, RequiredRole::Member)
        }
        (TaskStatus::InProgress, StatusAction::MoveToDone) => {
            edge(TaskStatus::Done, RequiredRole::Member)
        }
        (TaskStatus::InProgress, StatusAction::MoveBackToToDo) => {
            edge(TaskStatus::ToDo, RequiredRole::Member)
        }
        (TaskStatus::Done, StatusAction::MoveBackToInProgress) => {
            edge(TaskStatus::InProgress, RequiredRole::Member)
        }
        _ => None,
    }
}
