//! The entry and user services: ownership and date rules, batch processing,
//! accounts and credentials, and the per-user response cache, on top of an
//! injected store and cache.

mod entries;
mod error;
mod users;

pub use entries::EntryService;
pub use error::ServiceError;
pub use users::UserService;
