//! The response envelope every entry service operation returns.

use serde::{Deserialize, Serialize};

/// Status code used for batches where some items succeeded and some failed.
pub const MULTI_STATUS: u16 = 207;

/// Outcome of a service operation, including business-rule failures.
///
/// `status` is true for full and partial success. `errors` carries one
/// human-readable reason per failed item or invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(status_code: u16, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status: true,
            message: message.into(),
            data,
            errors: Vec::new(),
        }
    }

    pub fn partial_success(data: T, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status_code: MULTI_STATUS,
            status: true,
            message: message.into(),
            data: Some(data),
            errors,
        }
    }

    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status: false,
            message: message.into(),
            data: None,
            errors: Vec::new(),
        }
    }

    /// Attaches per-field or per-item reasons to a response.
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}
