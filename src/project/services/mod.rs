//! Application services for project administration.

mod membership;

pub use membership::{
    CreateProjectRequest, ProjectService, ProjectServiceError, ProjectServiceResult,
};
