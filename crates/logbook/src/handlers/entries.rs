//! Logbook entry handlers.
//!
//! Each handler resolves the caller, validates the payload and hands off to
//! the entry service. The service's `ApiResponse` becomes the HTTP response
//! as-is.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use logbook_auth::{AdminUser, CurrentUser};
use logbook_core::entry::{
    validate_batch_size, validate_batch_update_request, validate_create_request,
    validate_update_request, BatchUpdateEntryRequest, CreateEntryRequest, ExportEntriesQuery,
    UpdateEntryRequest, ValidationError,
};
use logbook_core::export::CSV_FILE_NAME;

use super::{invalid_payload, parse_body, respond};
use crate::{context::RequestContext, handlers::AppError, state::AppState};

fn messages(errors: Vec<ValidationError>) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

fn check_batch_size(len: usize) -> Result<(), Response> {
    validate_batch_size(len).map_err(|error| invalid_payload(vec![error.to_string()]))
}

/// Validates every item of a batch, prefixing each error with its position.
fn validate_items<T>(
    items: &[T],
    validate: impl Fn(&T) -> Result<(), Vec<ValidationError>>,
) -> Result<(), Response> {
    check_batch_size(items.len())?;

    let errors: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| validate(item).err().map(|errors| (index, errors)))
        .flat_map(|(index, errors)| {
            errors
                .into_iter()
                .map(move |error| format!("Item {}: {}", index, error))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(invalid_payload(errors))
    }
}

// ============================================================================
// Reads
// ============================================================================

/// GET /api/logbook - the caller's entries.
pub async fn list_entries(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Response {
    respond(state.entries.get_entries_for_user(user.user_id).await)
}

/// GET /api/logbook/entries - every entry (administrators only).
pub async fn list_all_entries(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> Response {
    tracing::debug!(admin_id = %admin.user_id, "Listing all entries");
    respond(state.entries.get_all_entries().await)
}

/// GET /api/logbook/{id}
pub async fn get_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    respond(state.entries.get_entry_by_id(id, user.user_id).await)
}

// ============================================================================
// Single-entry writes
// ============================================================================

/// POST /api/logbook
pub async fn create_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(errors) = validate_create_request(&request) {
        return invalid_payload(messages(errors));
    }

    tracing::debug!(request_id = %ctx.request_id, user_id = %user.user_id, "Create entry");
    respond(state.entries.create_entry(request, user.user_id).await)
}

/// PUT /api/logbook/{id}
pub async fn update_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(errors) = validate_update_request(&request) {
        return invalid_payload(messages(errors));
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        user_id = %user.user_id,
        entry_id = %id,
        "Update entry"
    );
    respond(state.entries.update_entry(id, request, user.user_id).await)
}

/// DELETE /api/logbook/{id}
pub async fn delete_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Response {
    tracing::debug!(
        request_id = %ctx.request_id,
        user_id = %user.user_id,
        entry_id = %id,
        "Delete entry"
    );
    respond(state.entries.delete_entry(id, user.user_id).await)
}

// ============================================================================
// Batch writes
// ============================================================================

/// POST /api/logbook/create-multiple-entries
pub async fn create_entries(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<Vec<CreateEntryRequest>>, JsonRejection>,
) -> Response {
    let requests = match parse_body(payload) {
        Ok(requests) => requests,
        Err(response) => return response,
    };
    if let Err(response) = validate_items(&requests, validate_create_request) {
        return response;
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        user_id = %user.user_id,
        count = requests.len(),
        "Create entries"
    );
    respond(state.entries.create_entries(requests, user.user_id).await)
}

/// PUT /api/logbook/update-multiple-entries
pub async fn update_entries(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<Vec<BatchUpdateEntryRequest>>, JsonRejection>,
) -> Response {
    let requests = match parse_body(payload) {
        Ok(requests) => requests,
        Err(response) => return response,
    };
    if let Err(response) = validate_items(&requests, validate_batch_update_request) {
        return response;
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        user_id = %user.user_id,
        count = requests.len(),
        "Update entries"
    );
    respond(state.entries.update_entries(requests, user.user_id).await)
}

/// DELETE /api/logbook/delete-multiple-entries
pub async fn delete_entries(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<Vec<Uuid>>, JsonRejection>,
) -> Response {
    let ids = match parse_body(payload) {
        Ok(ids) => ids,
        Err(response) => return response,
    };
    if let Err(response) = check_batch_size(ids.len()) {
        return response;
    }

    tracing::debug!(
        request_id = %ctx.request_id,
        user_id = %user.user_id,
        count = ids.len(),
        "Delete entries"
    );
    respond(state.entries.delete_entries(ids, user.user_id).await)
}

// ============================================================================
// Export
// ============================================================================

/// GET /api/logbook/download-csv?start_date&end_date
pub async fn download_csv(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ExportEntriesQuery>,
) -> Result<Response, AppError> {
    let date_range = match query.date_range() {
        Ok(range) => range,
        Err(err) => return Ok(invalid_payload(vec![err.to_string()])),
    };

    let bytes = state
        .entries
        .export_entries_csv(date_range, user.user_id)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}
