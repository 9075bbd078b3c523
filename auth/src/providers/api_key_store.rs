//! API key store trait.

use crate::api_key::ApiKey;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

/// Credential store for API keys.
///
/// Production backs this with the platform's SQL layer; lookups are always
/// by credential hash, never by the raw credential.
pub trait ApiKeyStore: Send + Sync {
    /// Look up a key by the SHA-256 hex digest of its credential.
    ///
    /// Returns `Ok(None)` when no key matches; the caller converts that
    /// into an undifferentiated `InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`](crate::error::AuthError::InternalError)
    /// if the store is unavailable.
    fn find_by_hash(
        &self,
        key_hash: &str,
    ) -> impl Future<Output = Result<Option<ApiKey>>> + Send;

    /// Record a successful authentication with the key.
    ///
    /// Best-effort: the authenticator fires this from a detached task and
    /// swallows failures, so implementations should be cheap and must not
    /// assume anyone observes their errors.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`](crate::error::AuthError::InternalError)
    /// if the store is unavailable.
    fn record_usage(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;
}
