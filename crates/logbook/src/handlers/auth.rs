//! Account handlers.
//!
//! Registration, login and refresh are anonymous. Password changes need a
//! signed-in caller; the user and role listings are for administrators.
//! Payload rules are checked by the user service.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Response,
    Json,
};
use uuid::Uuid;

use logbook_auth::{AdminUser, CurrentUser};
use logbook_core::user::{
    AddRolesRequest, ChangePasswordRequest, EmailQuery, LoginRequest, RefreshTokenRequest,
    RegisterUserRequest,
};

use super::{parse_body, respond};
use crate::{context::RequestContext, state::AppState};

// ============================================================================
// Anonymous
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::debug!(request_id = %ctx.request_id, user_name = %request.user_name, "Register");
    respond(state.users.register(request).await)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::debug!(request_id = %ctx.request_id, user_name = %request.user_name, "Login");
    respond(state.users.login(request).await)
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    respond(state.users.refresh_token(request).await)
}

// ============================================================================
// Signed-in caller
// ============================================================================

/// POST /api/auth/change-password
pub async fn change_password(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::debug!(request_id = %ctx.request_id, user_id = %user.user_id, "Change password");
    respond(state.users.change_password(user.user_id, request).await)
}

// ============================================================================
// Administrators
// ============================================================================

/// GET /api/auth/users
pub async fn list_users(AdminUser(admin): AdminUser, State(state): State<AppState>) -> Response {
    tracing::debug!(admin_id = %admin.user_id, "Listing users");
    respond(state.users.get_users().await)
}

/// GET /api/auth/users/{user_id}
pub async fn get_user(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Response {
    respond(state.users.get_user_by_id(user_id).await)
}

/// POST /api/auth/addRolesToUsers
pub async fn add_roles(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<AddRolesRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::debug!(
        request_id = %ctx.request_id,
        admin_id = %admin.user_id,
        email = %request.email,
        "Add roles"
    );
    respond(state.users.add_roles(request).await)
}

/// GET /api/auth/userRoles?email
pub async fn user_roles(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Response {
    respond(state.users.get_user_roles(&query.email).await)
}

/// DELETE /api/auth/delete-user?email (also accepts `userEmail`)
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<EmailQuery>,
) -> Response {
    tracing::debug!(
        request_id = %ctx.request_id,
        admin_id = %admin.user_id,
        email = %query.email,
        "Delete user"
    );
    respond(state.users.delete_user(&query.email).await)
}
