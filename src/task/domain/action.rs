//! Named workflow actions submitted against a root task's status.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow action driving a task status transition.
///
/// The wire names match the action identifiers the request layer submits
/// (`approve`, `moveToInProgress`, ...); the transition table decides which
/// edges they drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusAction {
    /// Creator approval moving a task out of pending approval.
    Approve,
    /// Starts work on an approved task, assigning it to team members.
    MoveToInProgress,
    /// Marks an in-progress task as completed.
    MoveToDone,
    /// Returns an in-progress task to the backlog.
    MoveBackToToDo,
    /// Reopens a completed task.
    MoveBackToInProgress,
}

impl StatusAction {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::MoveToInProgress => "moveToInProgress",
            Self::MoveToDone => "moveToDone",
            Self::MoveBackToToDo => "moveBackToToDo",
            Self::MoveBackToInProgress => "moveBackToInProgress",
        }
    }
}

impl TryFrom<&str> for StatusAction {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "approve" => Ok(Self::Approve),
            "moveToInProgress" => Ok(Self::MoveToInProgress),
            "moveToDone" => Ok(Self::MoveToDone),
            "moveBackToToDo" => Ok(Self::MoveBackToToDo),
            "moveBackToInProgress" => Ok(Self::MoveBackToInProgress),
            _ => Err(TaskDomainError::UnknownAction(value.to_owned())),
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
