//! Atelier: collaborative project and task tracking core.
//!
//! This crate provides the workflow engine behind a project/task tracker:
//! projects with membership-derived roles, and tasks that move through an
//! approval-and-execution lifecycle with a restricted subtask hierarchy.
//!
//! # Architecture
//!
//! Atelier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, etc.)
//!
//! # Modules
//!
//! - [`project`]: Project administration and role classification
//! - [`task`]: Task lifecycle state machine and workflow orchestration

pub mod project;
pub mod task;
