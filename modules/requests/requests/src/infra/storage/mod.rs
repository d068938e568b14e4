pub mod in_memory_repo;
pub mod matcher;

pub use in_memory_repo::{InMemoryHistoryRepository, InMemoryRequestsRepository};
