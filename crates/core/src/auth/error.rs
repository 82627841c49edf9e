use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("insufficient role: {0} required")]
    Forbidden(String),

    #[error("failed to issue token: {0}")]
    Issue(String),

    #[error("failed to hash password: {0}")]
    PasswordHash(String),
}
