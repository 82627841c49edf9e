//! HTTP handlers.
//!
//! Handlers turn the services' `ApiResponse` values into HTTP responses with
//! the same status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use logbook_core::response::ApiResponse;

pub mod auth;
pub mod entries;
pub mod error;
pub mod health;

pub use error::AppError;

const INVALID_PAYLOAD: &str = "Invalid payload";

/// Turns a service response into an HTTP response with the same status.
///
/// 204 responses carry no body.
fn respond<T: Serialize>(response: ApiResponse<T>) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }

    (status, Json(response)).into_response()
}

fn invalid_payload(errors: Vec<String>) -> Response {
    tracing::debug!(?errors, "Rejected invalid payload");
    respond(
        ApiResponse::<()>::failure(StatusCode::BAD_REQUEST.as_u16(), INVALID_PAYLOAD)
            .with_errors(errors),
    )
}

/// Unwraps a JSON body, answering 400 when it does not parse.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| invalid_payload(vec![rejection.body_text()]))
}
