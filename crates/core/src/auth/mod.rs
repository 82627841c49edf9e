mod error;
mod functions;
mod types;

pub use error::AuthError;
pub use functions::{build_claims, calculate_expiry, generate_refresh_token};
pub use types::{Claims, Identity, Role};
