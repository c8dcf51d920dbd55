//! Project aggregate root: membership roster and role classification.

use super::{ProjectDomainError, ProjectId, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Project aggregate root.
///
/// A project owns a team roster. The creator is enrolled at construction
/// time and can never be removed, so `classify` treats the creator as a
/// member everywhere membership is sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    description: Option<String>,
    creator: UserId,
    team_members: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project with the creator enrolled as its first member.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyProjectName`] if the name is blank
    /// after trimming.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        creator: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let normalized = validate_name(&name.into())?;
        let timestamp = clock.utc();

        Ok(Self {
            id: ProjectId::new(),
            name: normalized,
            description: normalize_description(description),
            creator,
            team_members: vec![creator],
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the project description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn creator(&self) -> UserId {
        self.creator
    }

    /// Returns the team roster, creator included.
    #[must_use]
    pub fn team_members(&self) -> &[UserId] {
        &self.team_members
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

    /// Classifies a user's role within this project.
    ///
    /// This is the single authorization source for every project and task
    /// operation.
    #[must_use]
    pub fn classify(&self, user: UserId) -> Role {
        if self.creator == user {
            Role::Creator
        } else if self.team_members.contains(&user) {
            Role::Member
        } else {
            Role::Unauthorized
        }
    }

    /// Updates the project name and/or description.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::NotAuthorized`] unless the actor is the
    /// creator, or [`ProjectDomainError::EmptyProjectName`] when the new
    /// name is blank.
    pub fn update_details(
        &mut self,
        role: Role,
        name: Option<&str>,
        description: Option<&str>,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if role != Role::Creator {
            return Err(ProjectDomainError::NotAuthorized("update project details"));
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

    /// Adds a user to the team roster.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::NotAuthorized`] unless the actor is the
    /// creator, or [`ProjectDomainError::AlreadyMember`] when the user is
    /// already enrolled.
    pub fn add_member(
        &mut self,
        role: Role,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if role != Role::Creator {
            return Err(ProjectDomainError::NotAuthorized("manage team membership"));
        }
        if self.team_members.contains(&user) {
            return Err(ProjectDomainError::AlreadyMember(user));
        }
        self.team_members.push(user);
        self.touch(clock);
        Ok(())
    }

    /// Removes a user from the team roster.
    ///
    /// The creator is a permanent member and can never be removed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::NotAuthorized`] unless the actor is the
    /// creator, [`ProjectDomainError::CreatorNotRemovable`] when targeting
    /// the creator, or [`ProjectDomainError::MemberNotFound`] when the user
    /// is not enrolled.
    pub fn remove_member(
        &mut self,
        role: Role,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<(), ProjectDomainError> {
        if role != Role::Creator {
            return Err(ProjectDomainError::NotAuthorized("manage team membership"));
        }
        if user == self.creator {
            return Err(ProjectDomainError::CreatorNotRemovable);
        }
        if !self.team_members.contains(&user) {
            return Err(ProjectDomainError::MemberNotFound(user));
        }
        self.team_members.retain(|member| *member != user);
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Trims a name, rejecting blank values.
fn validate_name(raw: &str) -> Result<String, ProjectDomainError> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(ProjectDomainError::EmptyProjectName);
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
