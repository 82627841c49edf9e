use chrono::Duration;

use crate::error::AuthError;

/// Token signing and validation settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 shared secret.
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
    /// Lifetime of refresh tokens, fixed when they are issued at login.
    pub refresh_token_ttl: Duration,
}

impl AuthConfig {
    /// Creates a config with the default issuer, audience, a one hour token
    /// TTL and a seven day refresh token TTL.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "logbook".to_string(),
            audience: "logbook".to_string(),
            token_ttl: Duration::minutes(60),
            refresh_token_ttl: Duration::days(7),
        }
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: HS256 signing secret (required)
    /// - `JWT_ISSUER`: Expected `iss` claim (default: `logbook`)
    /// - `JWT_AUDIENCE`: Expected `aud` claim (default: `logbook`)
    /// - `JWT_EXPIRES_MINUTES`: Lifetime of issued tokens (default: 60)
    /// - `JWT_REFRESH_DAYS`: Lifetime of refresh tokens (default: 7)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Config("JWT_SECRET must be set".to_string()))?;

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| "logbook".to_string());
        let audience = std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "logbook".to_string());

        let token_ttl = std::env::var("JWT_EXPIRES_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::minutes)
            .unwrap_or_else(|| Duration::minutes(60));

        let refresh_token_ttl = std::env::var("JWT_REFRESH_DAYS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::days)
            .unwrap_or_else(|| Duration::days(7));

        Ok(Self {
            secret,
            issuer,
            audience,
            token_ttl,
            refresh_token_ttl,
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl", &self.token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}
