//! Error types for project domain validation.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing or mutating project aggregates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The user is already on the team roster.
    #[error("user {0} is already a team member")]
    AlreadyMember(UserId),

    /// The removal target is the project creator.
    #[error("the project creator cannot be removed from the team")]
    CreatorNotRemovable,

    /// The removal target is not on the team roster.
    #[error("user {0} is not a team member")]
    MemberNotFound(UserId),

    /// The acting user lacks the creator role required for the operation.
    #[error("only the project creator may {0}")]
    NotAuthorized(&'static str),
}
