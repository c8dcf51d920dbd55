//! Domain model for projects and membership-derived authorization.
//!
//! The project domain owns the team roster and the role classification
//! consumed by every workflow operation, keeping authorization decisions in
//! one auditable place.

mod error;
mod ids;
mod project;
mod role;

pub use error::ProjectDomainError;
pub use ids::{ProjectId, UserId};
pub use project::Project;
pub use role::{RequiredRole, Role};
