//! Project administration and membership-based authorization.
//!
//! Projects own a team roster; every workflow decision in the task module
//! starts from the role a project assigns to the acting user. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
