//! Error types for credential flows.

use thiserror::Error;

/// Errors produced by registration, login, and bootstrap.
#[derive(Debug, Error)]
pub enum Error {
    /// The username is already registered.
    #[error("username already registered: {0}")]
    CredentialConflict(String),

    /// Unknown identity or credential mismatch. The two cases are logged
    /// distinctly but never distinguished externally, so responses cannot
    /// be used to enumerate identities.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Password hashing infrastructure failure.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Core token or policy error.
    #[error(transparent)]
    Core(#[from] rowgate_core::AuthError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Record (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for credential flow operations.
pub type Result<T> = std::result::Result<T, Error>;
