use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use logbook_core::response::ApiResponse;
use logbook_core::storage::{repository_error_to_status_code, RepositoryError};

use crate::service::ServiceError;

/// Error type for handlers that propagate infrastructure failures with `?`.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let repo_error = self
            .0
            .downcast_ref::<RepositoryError>()
            .or_else(|| match self.0.downcast_ref::<ServiceError>() {
                Some(ServiceError::Repository(err)) => Some(err),
                _ => None,
            });

        repo_error
            .map(repository_error_to_status_code)
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(status = %status, error = %self.0, "Request failed");

        let message = if status.is_server_error() {
            "An error occurred. Request unsuccessful.".to_string()
        } else {
            self.0.to_string()
        };

        let body: ApiResponse<()> = ApiResponse::failure(status.as_u16(), message);
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
