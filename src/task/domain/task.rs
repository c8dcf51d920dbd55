//! Task aggregate root and its status/priority lifecycle types.

use super::{ParseTaskStatusError, StatusAction, TaskDomainError, TaskId, transition_for};
use crate::project::domain::{ProjectId, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created and awaits creator approval.
    PendingApproval,
    /// Task is approved and waiting to be picked up.
    ToDo,
    /// Task is being worked on by its assignees.
    InProgress,
    /// Task has been completed.
    Done,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending_approval" => Ok(Self::PendingApproval),
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Default priority for newly created root tasks.
    Low,
    /// Elevated priority.
    Medium,
    /// Highest priority; listed first on project boards.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns the board ordering rank; lower ranks sort first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TaskDomainError::InvalidPriority(value.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task aggregate root.
///
/// Root tasks (`parent_id == None`) carry the full status and priority
/// lifecycle. Subtasks are frozen at creation: their status stays
/// `PendingApproval`, their priority is stamped from the parent, and only
/// content edits and deletion remain available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project: ProjectId,
    parent_id: Option<TaskId>,
    name: String,
    description: Option<String>,
    status: TaskStatus,
    priority: Priority,
    assignees: Vec<UserId>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Task {
    /// Creates a new root task in `PendingApproval` with `Low` priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidName`] if the name is blank after
    /// trimming.
    pub fn new_root(
        name: impl Into<String>,
        description: Option<String>,
        project: ProjectId,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        Self::create(name, description, project, None, Priority::Low, created_by, clock)
    }

    /// Creates a new subtask under a root task.
    ///
    /// The subtask joins the parent's project and inherits the parent's
    /// *current* priority; the stamp is never re-synchronized if the parent's
    /// priority later changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidHierarchy`] when the parent is
    /// itself a subtask, or [`TaskDomainError::InvalidName`] when the name is
    /// blank.
    pub fn new_subtask(
        name: impl Into<String>,
        description: Option<String>,
        parent: &Self,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if parent.parent_id.is_some() {
            return Err(TaskDomainError::InvalidHierarchy);
        }
        Self::create(
            name,
            description,
            parent.project,
            Some(parent.id),
            parent.priority,
            created_by,
            clock,
        )
    }

    fn create(
        name: impl Into<String>,
        description: Option<String>,
        project: ProjectId,
        parent_id: Option<TaskId>,
        priority: Priority,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let validated_name = validate_name(&name.into())?;
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            project,
            parent_id,
            name: validated_name,
            description: normalize_description(description),
            status: TaskStatus::PendingApproval,
            priority,
            assignees: Vec::new(),
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
            version: 1,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project(&self) -> ProjectId {
        self.project
    }

    /// Returns the parent task identifier for subtasks.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns whether this task is a subtask.
    #[must_use]
    pub const fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the assigned team members, in assignment order.
    #[must_use]
    pub fn assignees(&self) -> &[UserId] {
        &self.assignees
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic-concurrency version counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Applies a workflow action against the task's status.
    ///
    /// Validation runs in full before any field changes, so a failed call
    /// leaves the task untouched. `assignees` is consulted only by
    /// [`StatusAction::MoveToInProgress`], which stores it (deduplicated, in
    /// submission order).
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SubtaskImmutable`] for subtasks,
    /// [`TaskDomainError::IllegalTransition`] when the action has no edge
    /// from the current status, [`TaskDomainError::NotAuthorized`] when the
    /// role does not meet the edge's requirement, and
    /// [`TaskDomainError::MissingAssignees`] when moving to in-progress
    /// without assignees.
    pub fn apply_status_action(
        &mut self,
        role: Role,
        action: StatusAction,
        assignees: &[UserId],
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.parent_id.is_some() {
            return Err(TaskDomainError::SubtaskImmutable(self.id));
        }
        let Some(transition) = transition_for(self.status, action) else {
            return Err(TaskDomainError::IllegalTransition {
                from: self.status,
                action,
            });
        };
        if !role.satisfies(transition.required_role) {
            return Err(TaskDomainError::NotAuthorized(format!(
                "perform '{action}'"
            )));
        }
        if action == StatusAction::MoveToInProgress {
            if assignees.is_empty() {
                return Err(TaskDomainError::MissingAssignees);
            }
            self.assignees = dedup_preserving_order(assignees);
        }
        self.status = transition.to;
        self.touch(clock);
        Ok(())
    }

    /// Changes the task priority.
    ///
    /// Side-effect-free on `status`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SubtaskImmutable`] for subtasks or
    /// [`TaskDomainError::NotAuthorized`] unless the actor is the project
    /// creator.
    pub fn change_priority(
        &mut self,
        role: Role,
        priority: Priority,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.parent_id.is_some() {
            return Err(TaskDomainError::SubtaskImmutable(self.id));
        }
        if role != Role::Creator {
            return Err(TaskDomainError::NotAuthorized(
                "change task priority".to_owned(),
            ));
        }
        self.priority = priority;
        self.touch(clock);
        Ok(())
    }

    /// Updates the task name and/or description.
    ///
    /// Content edits are open to all members and apply to subtasks as well;
    /// the subtask freeze covers only status and priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAuthorized`] when the actor is not a
    /// member, or [`TaskDomainError::InvalidName`] when the new name is
    /// blank after trimming.
    pub fn edit_details(
        &mut self,
        role: Role,
        name: Option<&str>,
        description: Option<&str>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if role == Role::Unauthorized {
            return Err(TaskDomainError::NotAuthorized(
                "edit task details".to_owned(),
            ));
        }
        let validated_name = name.map(validate_name).transpose()?;
        if let Some(new_name) = validated_name {
            self.name = new_name;
        }
        if let Some(new_description) = description {
            self.description = normalize_description(Some(new_description.to_owned()));
        }
        self.touch(clock);
        Ok(())
    }

    /// Advances the mutation timestamp and the concurrency version.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.version += 1;
    }
}

/// Trims a name, rejecting blank values.
fn validate_name(raw: &str) -> Result<String, TaskDomainError> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(TaskDomainError::InvalidName);
    }
    Ok(normalized.to_owned())
}

/// Trims a description, mapping blank values to absent.
fn normalize_description(raw: Option<String>) -> Option<String> {
    raw.and_then(|value| {
        let normalized = value.trim();
        (!normalized.is_empty()).then(|| normalized.to_owned())
    })
}

/// Keeps the first occurrence of each user, in submission order.
fn dedup_preserving_order(users: &[UserId]) -> Vec<UserId> {
    let mut unique = Vec::with_capacity(users.len());
    for user in users {
        if !unique.contains(user) {
            unique.push(*user);
        }
    }
    unique
}
