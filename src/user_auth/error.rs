//! Identity error types

use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Username or email already exists")]
    UserExists,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            AuthError::UserExists => ErrorKind::UserExists,
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                ErrorKind::Unauthenticated
            }
            AuthError::Hash(_) | AuthError::Token(_) => ErrorKind::Internal,
            AuthError::Database(_) => ErrorKind::Storage,
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errs: validator::ValidationErrors) -> Self {
        AuthError::InvalidParameter(errs.to_string())
    }
}
