//! In-memory repository for task workflow tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::project::domain::ProjectId;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository with version-checked updates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    // Arrival order per project; stable sorts over this preserve it.
    project_index: HashMap<ProjectId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: &impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn remove_from_project_index(state: &mut InMemoryTaskState, project: ProjectId, task_id: TaskId) {
    if let Some(ids) = state.project_index.get_mut(&project) {
        ids.retain(|id| *id != task_id);
        if ids.is_empty() {
            state.project_index.remove(&project);
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_poisoned(&err))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state
            .project_index
            .entry(task.project())
            .or_default()
            .push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_poisoned(&err))?;
        let stored_version = state
            .tasks
            .get(&task.id())
            .map(Task::version)
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        // Conditional write: the snapshot must have been mutated exactly once
        // since it was read.
        if task.version() != stored_version + 1 {
            return Err(TaskRepositoryError::VersionConflict(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(|err| lock_poisoned(&err))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_poisoned(&err))?;
        Ok(state
            .project_index
            .get(&project)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_with_subtasks(&self, id: TaskId) -> TaskRepositoryResult<usize> {
        let mut state = self.state.write().map_err(|err| lock_poisoned(&err))?;
        let root = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        remove_from_project_index(&mut state, root.project(), id);

        // Cascade to direct subtasks under the same write lock, so no
        // subtask can outlive its deleted parent.
        let subtask_ids: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.parent_id() == Some(id))
            .map(Task::id)
            .collect();
        for subtask_id in &subtask_ids {
            state.tasks.remove(subtask_id);
            remove_from_project_index(&mut state, root.project(), *subtask_id);
        }
        Ok(1 + subtask_ids.len())
    }
}
