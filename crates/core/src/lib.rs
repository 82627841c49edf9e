//! Functional core for the logbook service.
//!
//! Entry and account types, validation and batch classification, cache and
//! storage traits, identity types, the response envelope and CSV export.
//! Nothing in this crate performs I/O.

pub mod auth;
pub mod cache;
pub mod entry;
pub mod export;
pub mod response;
pub mod serde;
pub mod storage;
pub mod user;
