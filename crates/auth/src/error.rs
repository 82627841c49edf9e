use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Auth errors for the logbook_auth crate.
///
/// Wraps the core `AuthError` and adds configuration failures, which only
/// occur at startup.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Core(#[from] logbook_core::auth::AuthError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        use logbook_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(core_err) => match core_err {
                CoreError::MissingToken | CoreError::InvalidToken(_) | CoreError::TokenExpired => {
                    StatusCode::UNAUTHORIZED
                }
                CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoreError::Issue(_) | CoreError::PasswordHash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AuthError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Auth error");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, "Request rejected by auth");
            self.to_string()
        };

        let body = serde_json::json!({
            "status_code": status.as_u16(),
            "status": false,
            "message": message,
            "data": null,
            "errors": [],
        });

        (status, Json(body)).into_response()
    }
}
