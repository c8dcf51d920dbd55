//! Domain model for the task workflow engine.
//!
//! The task domain models the two-level task hierarchy, the approval-and-
//! execution status lifecycle, and the role-gated mutations over both, while
//! keeping all infrastructure concerns outside of the domain boundary.

mod action;
mod error;
mod ids;
mod task;
mod transition;

pub use action::StatusAction;
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use task::{Priority, Task, TaskStatus};
pub use transition::{Transition, transition_for};
