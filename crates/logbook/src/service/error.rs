use thiserror::Error;
use tokio::task::JoinError;

use logbook_auth::AuthError;
use logbook_core::export::ExportError;
use logbook_core::storage::RepositoryError;

/// Infrastructure failures surfaced by the entry and user services.
///
/// Business-rule outcomes (not found, forbidden, past dates, bad
/// credentials) are `ApiResponse` values and never reach this type.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] JoinError),
}
