//! Error types for admission control.

use thiserror::Error;
use trellis_core::scope::Scope;

/// Result type alias for admission-control operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of authentication and authorization.
///
/// Everything here is local to the request and terminates it synchronously;
/// nothing is retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented.
    #[error("Missing API credential")]
    MissingCredential,

    /// The credential is malformed, unknown, or does not match any key.
    ///
    /// Carries no detail: callers must not be able to
    /// distinguish "bad prefix" from "unknown key".
    #[error("Invalid API credential")]
    InvalidCredentials,

    /// The key exists but has been revoked.
    #[error("API key has been revoked")]
    KeyRevoked,

    /// The key exists but is past its expiry timestamp.
    #[error("API key has expired")]
    KeyExpired,

    /// The key is valid but lacks the required scope.
    #[error("Insufficient scope: {required} required")]
    InsufficientScope {
        /// Scope the operation requires.
        required: Scope,
    },

    /// The credential store or bucket store failed.
    #[error("Internal error: {0}")]
    InternalError(String),
}
