use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{Claims, Identity};

/// Length of generated refresh tokens.
pub const REFRESH_TOKEN_LENGTH: usize = 64;

/// Generate a cryptographically random refresh token.
pub fn generate_refresh_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Calculate token expiry from issue time and TTL.
pub fn calculate_expiry(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    issued_at + ttl
}

/// Build the claims for `identity`, valid for `ttl` from `issued_at`.
pub fn build_claims(
    identity: &Identity,
    issuer: &str,
    audience: &str,
    issued_at: DateTime<Utc>,
    ttl: Duration,
) -> Claims {
    Claims {
        sub: identity.user_id,
        roles: identity.roles.clone(),
        iss: issuer.to_string(),
        aud: audience.to_string(),
        iat: issued_at.timestamp(),
        exp: calculate_expiry(issued_at, ttl).timestamp(),
    }
}
