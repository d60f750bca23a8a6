//! Goat persistence adapters.
//!
//! The primary store for goats is an external collaborator. The in-memory
//! repository lets the service run end to end locally and in tests.

mod in_memory_goat_repository;

pub use in_memory_goat_repository::InMemoryGoatRepository;
