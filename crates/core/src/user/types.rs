use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{Identity, Role};

use super::operations::normalize;

/// A registered account.
///
/// `user_name` and `email` are unique across accounts, compared through
/// their normalized (trimmed, upper-cased) forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_country_code: String,
    pub phone_number: String,
    /// PHC string produced by the password hasher. Never leaves the server.
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub refresh_token: Option<String>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn normalized_user_name(&self) -> String {
        normalize(&self.user_name)
    }

    pub fn normalized_email(&self) -> String {
        normalize(&self.email)
    }

    /// The identity carried by this user's access tokens.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.roles.clone())
    }

    /// Grants every role in `roles` the user does not hold yet.
    ///
    /// Returns the roles that were actually added.
    pub fn grant_roles(&mut self, roles: &[Role]) -> Vec<Role> {
        let mut added = Vec::new();
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(*role);
                added.push(*role);
            }
        }
        added
    }

    /// Returns true if `token` matches the stored refresh token and has not
    /// expired at `now`.
    pub fn accepts_refresh_token(&self, token: &str, now: DateTime<Utc>) -> bool {
        let matches = self.refresh_token.as_deref() == Some(token);
        let live = self.refresh_token_expires_at.is_some_and(|exp| exp > now);
        matches && live
    }

    pub fn clear_refresh_token(&mut self) {
        self.refresh_token = None;
        self.refresh_token_expires_at = None;
    }

    pub fn to_dto(&self) -> UserDto {
        UserDto::from(self)
    }
}

/// What clients see of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub user_name: String,
    pub normalized_user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub normalized_email: String,
    pub phone_country_code: String,
    pub phone_number: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            normalized_user_name: user.normalized_user_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            normalized_email: user.normalized_email(),
            phone_country_code: user.phone_country_code.clone(),
            phone_number: user.phone_number.clone(),
            date_created: user.created_at,
            date_modified: user.updated_at,
        }
    }
}

/// Tokens handed out on login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDto {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}
