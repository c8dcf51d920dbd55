//! Service orchestration tests for the task workflow engine.

use std::sync::Arc;

use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{Project, ProjectId, Role, UserId},
    ports::ProjectRepository,
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Priority, Task, TaskDomainError, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    services::{CreateTaskRequest, TaskWorkflowError, TaskWorkflowService},
};
use async_trait::async_trait;
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;

type TestService =
    TaskWorkflowService<InMemoryTaskRepository, InMemoryProjectRepository, DefaultClock>;

struct Workspace {
    service: TestService,
    tasks: Arc<InMemoryTaskRepository>,
    projects: Arc<InMemoryProjectRepository>,
    clock: Arc<DefaultClock>,
    project_id: ProjectId,
    creator: UserId,
    member: UserId,
    outsider: UserId,
}

/// Seeds a project with a creator, one plain member, and an outsider.
async fn seeded_workspace() -> eyre::Result<Workspace> {
    let clock = Arc::new(DefaultClock);
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let projects = Arc::new(InMemoryProjectRepository::new());
    let creator = UserId::new();
    let member = UserId::new();
    let outsider = UserId::new();

    let mut project = Project::new("Website revamp", None, creator, &*clock)?;
    project.add_member(Role::Creator, member, &*clock)?;
    projects.store(&project).await?;

    let service = TaskWorkflowService::new(
        Arc::clone(&tasks),
        Arc::clone(&projects),
        Arc::clone(&clock),
    );
    Ok(Workspace {
        service,
        tasks,
        projects,
        clock,
        project_id: project.id(),
        creator,
        member,
        outsider,
    })
}

async fn stored_task(ws: &Workspace, id: TaskId) -> eyre::Result<Task> {
    ws.tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| eyre::eyre!("task {id} should be stored"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_persists_a_pending_root() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;

    let created = ws
        .service
        .create_task(
            CreateTaskRequest::new("Redesign header", ws.project_id, ws.member)
                .with_description("Sticky nav and new logo"),
        )
        .await?;

    ensure!(created.status() == TaskStatus::PendingApproval);
    ensure!(created.priority() == Priority::Low);
    ensure!(created.created_by() == ws.member);
    ensure!(stored_task(&ws, created.id()).await? == created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_outsiders_without_a_record() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;

    let result = ws
        .service
        .create_task(CreateTaskRequest::new("Sneaky", ws.project_id, ws.outsider))
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::NotAuthorized(_)))
    ));
    ensure!(ws.tasks.find_by_project(ws.project_id).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_missing_projects() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let unknown = ProjectId::new();

    let result = ws
        .service
        .create_task(CreateTaskRequest::new("Orphan", unknown, ws.member))
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::ProjectNotFound(id)) if id == unknown
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_subtask_inherits_the_parent_priority_at_creation() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let root = ws
        .service
        .create_task(CreateTaskRequest::new("Migrate CMS", ws.project_id, ws.member))
        .await?;
    ws.service
        .change_priority(root.id(), ws.creator, "high")
        .await?;

    let subtask = ws
        .service
        .create_task(
            CreateTaskRequest::new("Export articles", ws.project_id, ws.member)
                .with_parent(root.id()),
        )
        .await?;
    ensure!(subtask.priority() == Priority::High);

    // Lowering the root afterwards must not re-synchronize the subtask.
    ws.service
        .change_priority(root.id(), ws.creator, "low")
        .await?;
    ensure!(stored_task(&ws, subtask.id()).await?.priority() == Priority::High);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_subtask_under_a_subtask_creates_no_record() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let root = ws
        .service
        .create_task(CreateTaskRequest::new("Root", ws.project_id, ws.member))
        .await?;
    let subtask = ws
        .service
        .create_task(
            CreateTaskRequest::new("Child", ws.project_id, ws.member).with_parent(root.id()),
        )
        .await?;

    let result = ws
        .service
        .create_task(
            CreateTaskRequest::new("Grandchild", ws.project_id, ws.member)
                .with_parent(subtask.id()),
        )
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::InvalidHierarchy))
    ));
    ensure!(ws.tasks.find_by_project(ws.project_id).await?.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_subtask_rejects_parents_from_other_projects() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let mut other_project = Project::new("Side quest", None, ws.creator, &*ws.clock)?;
    other_project.add_member(Role::Creator, ws.member, &*ws.clock)?;
    ws.projects.store(&other_project).await?;
    let foreign_root = ws
        .service
        .create_task(CreateTaskRequest::new(
            "Foreign root",
            other_project.id(),
            ws.member,
        ))
        .await?;

    let result = ws
        .service
        .create_task(
            CreateTaskRequest::new("Cross-link", ws.project_id, ws.member)
                .with_parent(foreign_root.id()),
        )
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::TaskNotFound(id)) if id == foreign_root.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_workflow_runs_end_to_end() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Launch beta", ws.project_id, ws.member))
        .await?;

    let approved = ws
        .service
        .apply_status_action(task.id(), ws.creator, "approve", &[])
        .await?;
    ensure!(approved.status() == TaskStatus::ToDo);

    let started = ws
        .service
        .apply_status_action(task.id(), ws.member, "moveToInProgress", &[ws.member])
        .await?;
    ensure!(started.status() == TaskStatus::InProgress);
    ensure!(started.assignees() == [ws.member]);

    let parked = ws
        .service
        .apply_status_action(task.id(), ws.member, "moveBackToToDo", &[])
        .await?;
    ensure!(parked.status() == TaskStatus::ToDo);

    let before_failure = stored_task(&ws, task.id()).await?;
    let result = ws
        .service
        .apply_status_action(task.id(), ws.creator, "moveToDone", &[])
        .await;
    let Err(TaskWorkflowError::Domain(TaskDomainError::IllegalTransition { from, action })) =
        &result
    else {
        bail!("expected an illegal transition, got {result:?}");
    };
    ensure!(*from == TaskStatus::ToDo);
    ensure!(action.as_str() == "moveToDone");
    // The stored task is untouched by the failed attempt.
    ensure!(stored_task(&ws, task.id()).await? == before_failure);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_action_names_are_rejected() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Typo bait", ws.project_id, ws.member))
        .await?;

    let result = ws
        .service
        .apply_status_action(task.id(), ws.creator, "promote", &[])
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::UnknownAction(name))) if name == "promote"
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_get_an_authorization_error_not_a_not_found() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Visible task", ws.project_id, ws.member))
        .await?;

    let result = ws
        .service
        .apply_status_action(task.id(), ws.outsider, "approve", &[])
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::NotAuthorized(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subtask_status_changes_are_rejected_at_the_service() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let root = ws
        .service
        .create_task(CreateTaskRequest::new("Root", ws.project_id, ws.member))
        .await?;
    let subtask = ws
        .service
        .create_task(
            CreateTaskRequest::new("Child", ws.project_id, ws.member).with_parent(root.id()),
        )
        .await?;

    let result = ws
        .service
        .apply_status_action(subtask.id(), ws.creator, "approve", &[])
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::SubtaskImmutable(id))) if id == subtask.id()
    ));
    ensure!(stored_task(&ws, subtask.id()).await?.status() == TaskStatus::PendingApproval);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn change_priority_is_creator_only() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Tune cache", ws.project_id, ws.member))
        .await?;

    let rejected = ws
        .service
        .change_priority(task.id(), ws.member, "high")
        .await;
    ensure!(matches!(
        rejected,
        Err(TaskWorkflowError::Domain(TaskDomainError::NotAuthorized(_)))
    ));
    ensure!(stored_task(&ws, task.id()).await?.priority() == Priority::Low);

    let updated = ws
        .service
        .change_priority(task.id(), ws.creator, "high")
        .await?;
    ensure!(updated.priority() == Priority::High);
    ensure!(updated.status() == TaskStatus::PendingApproval);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn change_priority_rejects_unknown_levels() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Tune cache", ws.project_id, ws.member))
        .await?;

    let result = ws
        .service
        .change_priority(task.id(), ws.creator, "urgent")
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::InvalidPriority(raw))) if raw == "urgent"
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_trims_and_persists() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Old name", ws.project_id, ws.member))
        .await?;

    let edited = ws
        .service
        .edit_task(task.id(), ws.member, Some("  New name "), Some(" notes "))
        .await?;
    ensure!(edited.name() == "New name");
    ensure!(edited.description() == Some("notes"));

    let rejected = ws
        .service
        .edit_task(task.id(), ws.member, Some("   "), None)
        .await;
    ensure!(matches!(
        rejected,
        Err(TaskWorkflowError::Domain(TaskDomainError::InvalidName))
    ));
    ensure!(stored_task(&ws, task.id()).await?.name() == "New name");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_task_requires_the_creator() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Protected", ws.project_id, ws.member))
        .await?;

    let result = ws.service.delete_task(task.id(), ws.member).await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::NotAuthorized(_)))
    ));
    ensure!(stored_task(&ws, task.id()).await? == task);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_root_cascades_to_its_subtasks() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let doomed = ws
        .service
        .create_task(CreateTaskRequest::new("Doomed root", ws.project_id, ws.member))
        .await?;
    for name in ["Child one", "Child two"] {
        ws.service
            .create_task(
                CreateTaskRequest::new(name, ws.project_id, ws.member).with_parent(doomed.id()),
            )
            .await?;
    }
    let survivor = ws
        .service
        .create_task(CreateTaskRequest::new("Survivor", ws.project_id, ws.member))
        .await?;

    let removed = ws.service.delete_task(doomed.id(), ws.creator).await?;

    ensure!(removed == 3);
    let remaining = ws.tasks.find_by_project(ws.project_id).await?;
    ensure!(remaining.len() == 1);
    ensure!(
        remaining
            .iter()
            .all(|task| task.parent_id() != Some(doomed.id()))
    );
    ensure!(remaining.first().map(Task::id) == Some(survivor.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_missing_task_reports_not_found() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let unknown = TaskId::new();

    let result = ws.service.delete_task(unknown, ws.creator).await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::TaskNotFound(id)) if id == unknown
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_orders_roots_by_priority_then_arrival() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let mut ids = Vec::new();
    for (name, priority) in [
        ("Backlog sweep", "low"),
        ("Fix checkout", "high"),
        ("Refresh docs", "medium"),
        ("Patch login", "high"),
    ] {
        let task = ws
            .service
            .create_task(CreateTaskRequest::new(name, ws.project_id, ws.member))
            .await?;
        ws.service
            .change_priority(task.id(), ws.creator, priority)
            .await?;
        ids.push(task.id());
    }

    let board = ws.service.list_for_project(ws.project_id).await?;

    let root_ids: Vec<TaskId> = board.roots.iter().map(Task::id).collect();
    let [low, high_first, medium, high_second] = ids.as_slice() else {
        bail!("expected four seeded tasks");
    };
    ensure!(root_ids == [*high_first, *high_second, *medium, *low]);
    ensure!(board.subtasks.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_groups_subtasks_in_creation_order() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let root = ws
        .service
        .create_task(CreateTaskRequest::new("Root", ws.project_id, ws.member))
        .await?;
    let mut subtask_ids = Vec::new();
    for name in ["First child", "Second child", "Third child"] {
        let subtask = ws
            .service
            .create_task(
                CreateTaskRequest::new(name, ws.project_id, ws.member).with_parent(root.id()),
            )
            .await?;
        subtask_ids.push(subtask.id());
    }

    let board = ws.service.list_for_project(ws.project_id).await?;

    ensure!(board.roots.len() == 1);
    let children = board
        .subtasks
        .get(&root.id())
        .ok_or_else(|| eyre::eyre!("subtasks should be grouped under the root"))?;
    let child_ids: Vec<TaskId> = children.iter().map(Task::id).collect();
    ensure!(child_ids == subtask_ids);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_for_a_missing_project_reports_not_found() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let unknown = ProjectId::new();

    let result = ws.service.list_for_project(unknown).await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::ProjectNotFound(id)) if id == unknown
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_snapshots_are_rejected_by_the_repository() -> eyre::Result<()> {
    let ws = seeded_workspace().await?;
    let task = ws
        .service
        .create_task(CreateTaskRequest::new("Contested", ws.project_id, ws.member))
        .await?;

    let mut first = stored_task(&ws, task.id()).await?;
    let mut second = first.clone();

    first.apply_status_action(Role::Creator, "approve".try_into()?, &[], &*ws.clock)?;
    ws.tasks.update(&first).await?;

    second.apply_status_action(Role::Creator, "approve".try_into()?, &[], &*ws.clock)?;
    let result = ws.tasks.update(&second).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::VersionConflict(id)) if id == task.id()
    ));
    ensure!(stored_task(&ws, task.id()).await? == first);
    Ok(())
}

mockall::mock! {
    ContendedTaskRepo {}

    #[async_trait]
    impl TaskRepository for ContendedTaskRepo {
        async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;
        async fn find_by_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>>;
        async fn delete_with_subtasks(&self, id: TaskId) -> TaskRepositoryResult<usize>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exhausted_retries_surface_as_a_conflict() -> eyre::Result<()> {
    let clock = Arc::new(DefaultClock);
    let projects = Arc::new(InMemoryProjectRepository::new());
    let creator = UserId::new();
    let project = Project::new("Contended project", None, creator, &*clock)?;
    projects.store(&project).await?;
    let task = Task::new_root("Contended task", None, project.id(), creator, &*clock)?;
    let task_id = task.id();

    // Every fresh read races against a writer that lands first.
    let mut contended = MockContendedTaskRepo::new();
    contended
        .expect_find_by_id()
        .returning(move |_| Ok(Some(task.clone())));
    contended
        .expect_update()
        .returning(|snapshot| Err(TaskRepositoryError::VersionConflict(snapshot.id())));

    let service = TaskWorkflowService::new(Arc::new(contended), projects, clock);
    let result = service
        .apply_status_action(task_id, creator, "approve", &[])
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Conflict(id)) if id == task_id
    ));
    Ok(())
}
