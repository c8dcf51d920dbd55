//! In-memory adapters backing project services in tests.

mod project;

pub use project::InMemoryProjectRepository;
