//! Workflow orchestration service: the single entry point for task
//! creation, status actions, priority changes, edits, deletion, and board
//! listings.

use crate::project::{
    domain::{Project, ProjectId, Role, UserId},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use crate::task::{
    domain::{Priority, StatusAction, Task, TaskDomainError, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on fresh-read retries after a version conflict.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Request payload for creating a root task or subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    name: String,
    description: Option<String>,
    project: ProjectId,
    parent_id: Option<TaskId>,
    actor: UserId,
}

impl CreateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, project: ProjectId, actor: UserId) -> Self {
        Self {
            name: name.into(),
            description: None,
            project,
            parent_id: None,
            actor,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the new task as a subtask of the given parent.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: TaskId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// A project's tasks partitioned for board rendering.
///
/// Roots are ordered by priority (high first, arrival order preserved on
/// ties); each root's subtasks are keyed by the root's ID and ordered by
/// creation time ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectBoard {
    /// Root tasks in board order.
    pub roots: Vec<Task>,
    /// Direct subtasks grouped under their root task.
    pub subtasks: HashMap<TaskId, Vec<Task>>,
}

/// Service-level errors for workflow operations.
#[derive(Debug, Error)]
pub enum TaskWorkflowError {
    /// Domain validation or authorization failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The task (or subtask parent) does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// Concurrent writers kept invalidating the read snapshot.
    #[error("task {0} was modified concurrently and retries are exhausted")]
    Conflict(TaskId),
    /// Task repository operation failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),
    /// Project repository operation failed.
    #[error(transparent)]
    ProjectRepository(#[from] ProjectRepositoryError),
}

/// Result type for workflow service operations.
pub type TaskWorkflowResult<T> = Result<T, TaskWorkflowError>;

/// Task workflow orchestration service.
///
/// Every mutation follows the same discipline: resolve the actor's role from
/// the owning project, let the domain validate and apply the change, then
/// persist through a version-checked write, retrying from a fresh read when
/// a concurrent writer got there first.
#[derive(Clone)]
pub struct TaskWorkflowService<T, P, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    projects: Arc<P>,
    clock: Arc<C>,
}

impl<T, P, C> TaskWorkflowService<T, P, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new workflow service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, projects: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            projects,
            clock,
        }
    }

    /// Creates a root task or subtask in `PendingApproval`.
    ///
    /// Root tasks start at `Low` priority; subtasks join the parent's
    /// project and inherit the parent's current priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the project or parent is absent,
    /// the actor is not a member, the parent is itself a subtask, or the
    /// name is blank.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskWorkflowResult<Task> {
        let project = self.load_project(request.project).await?;
        if project.classify(request.actor) == Role::Unauthorized {
            return Err(TaskDomainError::NotAuthorized(
                "create tasks in this project".to_owned(),
            )
            .into());
        }

        let task = match request.parent_id {
            Some(parent_id) => {
                let parent = self.load_task(parent_id).await?;
                // A parent from another project is not visible here.
                if parent.project() != project.id() {
                    return Err(TaskWorkflowError::TaskNotFound(parent_id));
                }
                Task::new_subtask(
                    request.name,
                    request.description,
                    &parent,
                    request.actor,
                    &*self.clock,
                )?
            }
            None => Task::new_root(
                request.name,
                request.description,
                project.id(),
                request.actor,
                &*self.clock,
            )?,
        };

        self.tasks.store(&task).await?;
        Ok(task)
    }

    /// Applies a named workflow action against a task's status.
    ///
    /// `assignees` is consulted only by `moveToInProgress`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] covering every failure kind of the
    /// transition table: `UnknownAction`, `SubtaskImmutable`,
    /// `IllegalTransition`, `NotAuthorized`, `MissingAssignees`, plus
    /// `Conflict` when concurrent writers exhaust the retry budget.
    pub async fn apply_status_action(
        &self,
        task_id: TaskId,
        actor: UserId,
        action_name: &str,
        assignees: &[UserId],
    ) -> TaskWorkflowResult<Task> {
        self.mutate_task(task_id, actor, |task, role, clock| {
            let action = StatusAction::try_from(action_name)?;
            task.apply_status_action(role, action, assignees, clock)
        })
        .await
    }

    /// Changes a root task's priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the task is absent, the actor is
    /// not the project creator, the task is a subtask, or the priority name
    /// is unrecognized.
    pub async fn change_priority(
        &self,
        task_id: TaskId,
        actor: UserId,
        priority_name: &str,
    ) -> TaskWorkflowResult<Task> {
        self.mutate_task(task_id, actor, |task, role, clock| {
            let priority = Priority::try_from(priority_name)?;
            task.change_priority(role, priority, clock)
        })
        .await
    }

    /// Updates a task's name and/or description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the task is absent, the actor is
    /// not a member, or the new name is blank.
    pub async fn edit_task(
        &self,
        task_id: TaskId,
        actor: UserId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> TaskWorkflowResult<Task> {
        self.mutate_task(task_id, actor, |task, role, clock| {
            task.edit_details(role, name, description, clock)
        })
        .await
    }

    /// Deletes a task; deleting a root cascades to its direct subtasks.
    ///
    /// Returns the number of removed records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the task is absent or the actor is
    /// not the project creator.
    pub async fn delete_task(&self, task_id: TaskId, actor: UserId) -> TaskWorkflowResult<usize> {
        let task = self.load_task(task_id).await?;
        let project = self.load_project(task.project()).await?;
        if project.classify(actor) != Role::Creator {
            return Err(TaskDomainError::NotAuthorized("delete the task".to_owned()).into());
        }
        Ok(self.tasks.delete_with_subtasks(task_id).await?)
    }

    /// Returns a project's tasks partitioned into a board.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::ProjectNotFound`] when the project is
    /// absent.
    pub async fn list_for_project(&self, project_id: ProjectId) -> TaskWorkflowResult<ProjectBoard> {
        let project = self.load_project(project_id).await?;
        let tasks = self.tasks.find_by_project(project.id()).await?;

        let mut board = ProjectBoard::default();
        for task in tasks {
            match task.parent_id() {
                Some(parent_id) => board.subtasks.entry(parent_id).or_default().push(task),
                None => board.roots.push(task),
            }
        }
        // Stable sorts: arrival order breaks priority ties, and subtasks
        // stay in creation order.
        board.roots.sort_by_key(|task| task.priority().rank());
        for subtasks in board.subtasks.values_mut() {
            subtasks.sort_by_key(Task::created_at);
        }
        Ok(board)
    }

    async fn load_task(&self, task_id: TaskId) -> TaskWorkflowResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskWorkflowError::TaskNotFound(task_id))
    }

    async fn load_project(&self, project_id: ProjectId) -> TaskWorkflowResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or(TaskWorkflowError::ProjectNotFound(project_id))
    }

    /// Reads, mutates under the actor's resolved role, and writes back with
    /// a version check, retrying from a fresh read on conflict.
    async fn mutate_task<F>(
        &self,
        task_id: TaskId,
        actor: UserId,
        apply: F,
    ) -> TaskWorkflowResult<Task>
    where
        F: Fn(&mut Task, Role, &C) -> Result<(), TaskDomainError>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut task = self.load_task(task_id).await?;
            let project = self.load_project(task.project()).await?;
            let role = project.classify(actor);
            if role == Role::Unauthorized {
                return Err(TaskDomainError::NotAuthorized(
                    "act on tasks in this project".to_owned(),
                )
                .into());
            }
            apply(&mut task, role, &*self.clock)?;
            match self.tasks.update(&task).await {
                Ok(()) => return Ok(task),
                Err(TaskRepositoryError::VersionConflict(_)) => {}
                Err(other) => return Err(other.into()),
            }
        }
        Err(TaskWorkflowError::Conflict(task_id))
    }
}
