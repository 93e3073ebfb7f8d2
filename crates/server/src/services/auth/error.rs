//! Authentication error types.

use thiserror::Error;

use foodgram_core::{EmailError, UsernameError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// A profile field other than email or username is invalid.
    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Password too weak or invalid.
    #[error("{field}: {message}")]
    WeakPassword {
        field: &'static str,
        message: String,
    },

    /// Email or username already taken.
    #[error("user with this {field} already exists")]
    UserAlreadyExists { field: &'static str },

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Current password did not match on password change.
    #[error("current password is wrong")]
    WrongPassword,

    /// The presented API token is unknown.
    #[error("Invalid token.")]
    InvalidToken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
