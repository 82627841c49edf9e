use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use logbook_core::auth::{
    build_claims, calculate_expiry, AuthError as CoreError, Claims, Identity,
};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// A signed access token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs a token for `identity`, valid for the configured TTL.
pub fn issue_access_token(
    config: &AuthConfig,
    identity: &Identity,
) -> Result<AccessToken, AuthError> {
    let issued_at = Utc::now();
    let claims = build_claims(
        identity,
        &config.issuer,
        &config.audience,
        issued_at,
        config.token_ttl,
    );
    let key = EncodingKey::from_secret(config.secret.as_bytes());

    let token = encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| CoreError::Issue(e.to_string()))?;

    Ok(AccessToken {
        token,
        expires_at: calculate_expiry(issued_at, config.token_ttl),
    })
}

fn validation(config: &AuthConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_audience(&[config.audience.as_str()]);
    validation
}

/// Verifies signature, issuer, audience and expiry, returning the caller.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Identity, AuthError> {
    let validation = validation(config);
    let key = DecodingKey::from_secret(config.secret.as_bytes());

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => CoreError::TokenExpired,
        _ => CoreError::InvalidToken(e.to_string()),
    })?;

    Ok(data.claims.identity())
}

/// Like [`verify_token`] but accepts tokens past their expiry.
///
/// Used when exchanging an expired access token and a refresh token for a
/// new pair. Signature, issuer and audience are still checked.
pub fn verify_expired_token(config: &AuthConfig, token: &str) -> Result<Identity, AuthError> {
    let mut validation = validation(config);
    validation.validate_exp = false;
    let key = DecodingKey::from_secret(config.secret.as_bytes());

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| CoreError::InvalidToken(e.to_string()))?;

    Ok(data.claims.identity())
}
