use std::fmt;

use thiserror::Error;

use crate::identity::models::AppId;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Outcome kinds reported by the credential store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("App not found: {0}")]
    AppNotFound(AppId),

    #[error("Database error: {0}")]
    Database(String),
}

/// Failure kinds the authentication service reports to its callers.
///
/// Login deliberately folds unknown email and wrong password into
/// `InvalidCredentials`. `Internal` carries diagnostic text for logs only;
/// transports must not forward it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid app id")]
    InvalidAppId,

    #[error("User not found")]
    UserNotFound,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{op}: {message}")]
    Internal { op: &'static str, message: String },
}

impl AuthError {
    /// Wrap an unexpected failure, tagged with the operation it happened in.
    pub fn internal(op: &'static str, err: impl fmt::Display) -> Self {
        AuthError::Internal {
            op,
            message: err.to_string(),
        }
    }
}
