//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use logbook_core::auth::{AuthError as CoreError, Identity, Role};

use crate::{AuthError, AuthState};

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(CoreError::MissingToken)?
        .to_str()
        .map_err(|_| CoreError::InvalidToken("invalid authorization header".to_string()))?;

    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| CoreError::MissingToken.into())
}

/// Extractor for the authenticated caller. Rejects with 401 when the bearer
/// token is missing, malformed or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let token = bearer_token(parts)?;
        let identity = auth_state.verify_token(token)?;

        tracing::trace!(user_id = %identity.user_id, "Resolved caller");
        Ok(CurrentUser(identity))
    }
}

/// Extractor for a caller holding the `Administrator` role. Rejects with 403
/// for authenticated callers without it.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        if !identity.is_admin() {
            return Err(CoreError::Forbidden(Role::Administrator.to_string()).into());
        }

        Ok(AdminUser(identity))
    }
}
