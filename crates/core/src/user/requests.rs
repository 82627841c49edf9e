//! API request types for account operations.
//!
//! Every field defaults to empty so a missing field surfaces as a validation
//! message instead of a deserialization failure.

use serde::{Deserialize, Serialize};

/// Request payload for self-registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub password: String,
    pub email: String,
    pub phone_country_code: String,
    pub phone_number: String,
    /// Role names. Empty means `User`.
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

/// An access token (possibly expired) and the refresh token issued with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshTokenRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddRolesRequest {
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Query string of the admin lookups keyed by email.
///
/// `userEmail` is accepted for the delete route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailQuery {
    #[serde(alias = "userEmail")]
    pub email: String,
}
