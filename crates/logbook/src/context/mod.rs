//! Request-scoped context module.
//!
//! Provides the `RequestContext` extractor, which carries per-request data
//! alongside the application-scoped `AppState`.

mod extractor;
mod types;

pub use types::RequestContext;
