//! Auth-specific error types.

use thiserror::Error;

/// Errors produced by token verification, policy resolution, and the
/// rule store.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token structure or claims could not be decoded.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token signature does not match the shared secret.
    #[error("token signature mismatch")]
    SignatureMismatch,

    /// Token expiration timestamp is in the past.
    #[error("token expired")]
    Expired,

    /// Token declares a signing algorithm other than the expected
    /// symmetric MAC.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A stored rule's expression does not match the grammar.
    #[error("invalid policy expression: {0:?}")]
    InvalidPolicyExpression(String),

    /// Unknown action name.
    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    /// Attempted mutation of a protected built-in rule.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Storage error during rule store operations.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Rule (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
