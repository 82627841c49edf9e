//! Bearer token authentication for the logbook service.
//!
//! This crate provides:
//! - HS256 JWT issuing and verification, including expired tokens presented
//!   for refresh
//! - Argon2id password hashing
//! - Axum extractors resolving the caller's identity (`CurrentUser`, `AdminUser`)

mod config;
mod error;
mod extractors;
mod passwords;
mod state;
mod tokens;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{AdminUser, CurrentUser};
pub use passwords::{hash_password, verify_password};
pub use state::AuthState;
pub use tokens::AccessToken;
