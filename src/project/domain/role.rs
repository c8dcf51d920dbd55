//! Role classification for project-scoped authorization.

use serde::{Deserialize, Serialize};

/// Role a user holds within a project.
///
/// Every operation derives its authorization from this single
/// classification; there are no ad hoc membership checks elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The user who created the project. Holds all member privileges plus
    /// approval, priority changes, deletion, and member management.
    Creator,
    /// A user on the project's team roster (the creator is also a member).
    Member,
    /// A user with no relationship to the project. Operations must fail
    /// with an authorization error, never a not-found error, once this
    /// classification is made.
    Unauthorized,
}

/// Minimum role an operation demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredRole {
    /// Only the project creator may proceed.
    Creator,
    /// Any team member (creator included) may proceed.
    Member,
}

impl Role {
    /// Returns whether this role meets the given requirement.
    ///
    /// `Creator` satisfies both requirements; `Member` satisfies only
    /// `RequiredRole::Member`; `Unauthorized` satisfies neither.
    #[must_use]
    pub const fn satisfies(self, required: RequiredRole) -> bool {
        match required {
            RequiredRole::Creator => matches!(self, Self::Creator),
            RequiredRole::Member => matches!(self, Self::Creator | Self::Member),
        }
    }
}
