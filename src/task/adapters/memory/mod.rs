//! In-memory adapters backing task services in tests.

mod task;

pub use task::InMemoryTaskRepository;
