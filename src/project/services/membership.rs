//! Service layer for project creation, maintenance, and team membership.

use crate::project::{
    domain::{Project, ProjectDomainError, ProjectId, Role, UserId},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    description: Option<String>,
    creator: UserId,
}

impl CreateProjectRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, creator: UserId) -> Self {
        Self {
            name: name.into(),
            description: None,
            creator,
        }
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Service-level errors for project operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Domain validation or authorization failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// The project does not exist.
    #[error("project not found: {0}")]
    NotFound(ProjectId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project administration and membership service.
#[derive(Clone)]
pub struct ProjectService<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ProjectService<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a project with the creator enrolled as its first member.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError`] when validation fails or the
    /// repository rejects persistence.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> ProjectServiceResult<Project> {
        let project = Project::new(
            request.name,
            request.description,
            request.creator,
            &*self.clock,
        )?;
        self.repository.store(&project).await?;
        Ok(project)
    }

    /// Retrieves a project, gated on membership.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] when the project is absent
    /// or [`ProjectDomainError::NotAuthorized`] when the actor is not on the
    /// team.
    pub async fn find_project(
        &self,
        project_id: ProjectId,
        actor: UserId,
    ) -> ProjectServiceResult<Project> {
        let project = self.load(project_id).await?;
        if project.classify(actor) == Role::Unauthorized {
            return Err(ProjectDomainError::NotAuthorized("view the project").into());
        }
        Ok(project)
    }

    /// Returns all projects where the user is the creator or a member.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn projects_for(&self, user: UserId) -> ProjectServiceResult<Vec<Project>> {
        Ok(self.repository.find_for_member(user).await?)
    }

    /// Updates a project's name and/or description.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError`] when the project is absent, the actor
    /// is not the creator, or the new name is blank.
    pub async fn update_details(
        &self,
        project_id: ProjectId,
        actor: UserId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ProjectServiceResult<Project> {
        self.mutate(project_id, actor, |project, role, clock| {
            project.update_details(role, name, description, clock)
        })
        .await
    }

    /// Adds a user to the project team.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError`] when the project is absent, the actor
    /// is not the creator, or the user is already enrolled.
    pub async fn add_member(
        &self,
        project_id: ProjectId,
        actor: UserId,
        user: UserId,
    ) -> ProjectServiceResult<Project> {
        self.mutate(project_id, actor, |project, role, clock| {
            project.add_member(role, user, clock)
        })
        .await
    }

    /// Removes a user from the project team.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError`] when the project is absent, the actor
    /// is not the creator, the user is the creator, or the user is not
    /// enrolled.
    pub async fn remove_member(
        &self,
        project_id: ProjectId,
        actor: UserId,
        user: UserId,
    ) -> ProjectServiceResult<Project> {
        self.mutate(project_id, actor, |project, role, clock| {
            project.remove_member(role, user, clock)
        })
        .await
    }

    /// Deletes a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError`] when the project is absent or the
    /// actor is not the creator.
    pub async fn delete_project(
        &self,
        project_id: ProjectId,
        actor: UserId,
    ) -> ProjectServiceResult<()> {
        let project = self.load(project_id).await?;
        if project.classify(actor) != Role::Creator {
            return Err(ProjectDomainError::NotAuthorized("delete the project").into());
        }
        self.repository.delete(project_id).await?;
        Ok(())
    }

    async fn load(&self, project_id: ProjectId) -> ProjectServiceResult<Project> {
        self.repository
            .find_by_id(project_id)
            .await?
            .ok_or(ProjectServiceError::NotFound(project_id))
    }

    /// Loads, mutates under the actor's resolved role, and persists.
    async fn mutate<F>(
        &self,
        project_id: ProjectId,
        actor: UserId,
        apply: F,
    ) -> ProjectServiceResult<Project>
    where
        F: FnOnce(&mut Project, Role, &C) -> Result<(), ProjectDomainError>,
    {
        let mut project = self.load(project_id).await?;
        let role = project.classify(actor);
        apply(&mut project, role, &*self.clock)?;
        self.repository.update(&project).await?;
        Ok(project)
    }
}
