//! Task workflow engine for Atelier.
//!
//! This module implements the approval-and-execution lifecycle of tasks:
//! role-gated status transitions over an explicit lookup table, the
//! two-level task/subtask hierarchy with priority inheritance, and
//! version-checked persistence so racing mutations never silently overwrite
//! each other. The module follows hexagonal architecture:
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
