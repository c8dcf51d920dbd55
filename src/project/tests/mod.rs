//! Unit and service tests for project administration.
