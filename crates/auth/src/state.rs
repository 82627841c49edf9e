//! Shared auth state.

use std::sync::Arc;

use axum::extract::FromRef;
use logbook_core::auth::Identity;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::tokens::{self, AccessToken};

/// State the auth extractors need, cheap to clone.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn issue_access_token(&self, identity: &Identity) -> Result<AccessToken, AuthError> {
        tokens::issue_access_token(&self.config, identity)
    }

    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        tokens::verify_token(&self.config, token)
    }

    pub fn verify_expired_token(&self, token: &str) -> Result<Identity, AuthError> {
        tokens::verify_expired_token(&self.config, token)
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
