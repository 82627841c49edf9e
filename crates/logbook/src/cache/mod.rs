//! Cache backend implementations.
//!
//! Concrete implementations of `logbook_core::cache::Cache`. Only the
//! process-local memory backend exists; responses are never shared across
//! instances.

pub mod memory;

pub use memory::MemoryCache;
