//! Error types for task workflow validation and parsing.

use super::{StatusAction, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating task aggregates.
///
/// Each variant is a distinct failure kind the request layer can map to a
/// precise client message; none collapse into a generic error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The acting user's role does not permit the attempted operation.
    #[error("not authorized to {0}")]
    NotAuthorized(String),

    /// A subtask cannot be nested under another subtask.
    #[error("cannot create a subtask under another subtask")]
    InvalidHierarchy,

    /// Status and priority of a subtask are fixed after creation.
    #[error("subtask {0} does not accept status or priority changes")]
    SubtaskImmutable(TaskId),

    /// The action has no edge from the task's current status.
    #[error("action '{action}' is not valid from status '{from}'")]
    IllegalTransition {
        /// Status the task currently holds.
        from: TaskStatus,
        /// Action that was attempted.
        action: StatusAction,
    },

    /// The action name does not map to any workflow action.
    #[error("unknown workflow action: {0}")]
    UnknownAction(String),

    /// Moving to in-progress requires at least one assignee.
    #[error("at least one assignee is required to move a task to in progress")]
    MissingAssignees,

    /// The priority value is not one of low, medium, or high.
    #[error("invalid priority value: {0}")]
    InvalidPriority(String),

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    InvalidName,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
