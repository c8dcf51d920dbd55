//! Unit and service tests for the task workflow engine.

mod workflow_service_tests;
