//! Error types for event fan-out.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for fan-out operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Failure modes of event delivery.
///
/// Everything here is terminal for one delivery attempt or one fan-out leg;
/// nothing propagates to the caller that triggered the event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The envelope could not be serialized.
    #[error("Envelope serialization failed: {0}")]
    Serialization(String),

    /// The receiver answered with a non-2xx status.
    #[error("Delivery rejected with HTTP {status}")]
    Rejected {
        /// The HTTP status the receiver returned.
        status: u16,
    },

    /// The delivery attempt exceeded its timeout and was aborted.
    #[error("Delivery timed out")]
    Timeout,

    /// The POST never completed (connect failure, DNS, TLS, ...).
    #[error("Delivery transport error: {0}")]
    Transport(String),

    /// No subscription with the given id exists.
    #[error("Webhook subscription {0} not found")]
    SubscriptionNotFound(Uuid),

    /// A backing store failed.
    #[error("Store unavailable: {0}")]
    Store(String),

    /// The email collaborator failed.
    #[error("Email delivery failed: {0}")]
    Email(String),
}
