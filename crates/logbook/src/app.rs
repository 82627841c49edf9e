use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        auth::{
            add_roles, change_password, delete_user, get_user, list_users, login, refresh_token,
            register, user_roles,
        },
        entries::{
            create_entries, create_entry, delete_entries, delete_entry, download_csv, get_entry,
            list_all_entries, list_entries, update_entries, update_entry,
        },
        health::livez,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let logbook_routes = Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/entries", get(list_all_entries))
        .route("/create-multiple-entries", post(create_entries))
        .route("/update-multiple-entries", put(update_entries))
        .route("/delete-multiple-entries", delete(delete_entries))
        .route("/download-csv", get(download_csv))
        .route(
            "/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        );

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/change-password", post(change_password))
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
        .route("/addRolesToUsers", post(add_roles))
        .route("/userRoles", get(user_roles))
        .route("/delete-user", delete(delete_user));

    // API routes with CORS
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/logbook", logbook_routes)
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
