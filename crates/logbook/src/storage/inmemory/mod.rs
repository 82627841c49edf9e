//! In-memory storage backend.
//!
//! Stores entries in a `HashMap` wrapped in `Arc<RwLock<_>>`. Data is lost
//! when the process exits. Also backs the service and handler tests.

mod repository;

pub use repository::InMemoryRepository;
