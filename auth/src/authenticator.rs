//! API-key authentication.

use crate::api_key::{hash_credential, AuthContext, CREDENTIAL_PREFIX};
use crate::error::{AuthError, Result};
use crate::providers::{ApiKeyStore, Clock};

/// Turns a presented bearer credential into an [`AuthContext`], or rejects it.
///
/// Rejections collapse to [`AuthError::InvalidCredentials`]
/// unless the key was found: a caller probing the API cannot distinguish a
/// malformed credential from an unknown one.
///
/// # Example
///
/// ```
/// use trellis_auth::authenticator::ApiKeyAuthenticator;
/// use trellis_auth::mocks::{ManualClock, MockApiKeyStore};
/// use trellis_auth::api_key::ApiKey;
/// use trellis_core::scope::Scope;
/// use uuid::Uuid;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MockApiKeyStore::new();
/// let (key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Read], None);
/// store.insert(key.clone());
///
/// let authenticator = ApiKeyAuthenticator::new(store, ManualClock::default());
/// let context = authenticator.authenticate(&credential).await.unwrap();
/// assert_eq!(context.organization_id, key.organization_id);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ApiKeyAuthenticator<K, C> {
    store: K,
    clock: C,
}

impl<K, C> ApiKeyAuthenticator<K, C>
where
    K: ApiKeyStore + Clone + Send + Sync + 'static,
    C: Clock,
{
    /// Create an authenticator over a credential store and a clock.
    pub const fn new(store: K, clock: C) -> Self {
        Self { store, clock }
    }

    /// Resolve `credential` to an authorization context.
    ///
    /// On success, a "last used" stamp is written from a detached task;
    /// that write never blocks and never fails the decision.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`]: bad prefix or no matching key
    /// - [`AuthError::KeyRevoked`]: key found but deactivated
    /// - [`AuthError::KeyExpired`]: key found but past its expiry
    /// - [`AuthError::InternalError`]: credential store unavailable
    pub async fn authenticate(&self, credential: &str) -> Result<AuthContext> {
        if !credential.starts_with(CREDENTIAL_PREFIX) {
            return Err(AuthError::InvalidCredentials);
        }

        let key_hash = hash_credential(credential);
        let key = self
            .store
            .find_by_hash(&key_hash)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !key.is_active {
            return Err(AuthError::KeyRevoked);
        }

        let now = self.clock.now();
        if let Some(expires_at) = key.expires_at {
            if expires_at <= now {
                return Err(AuthError::KeyExpired);
            }
        }

        // Best-effort usage stamp, detached from the request.
        let store = self.store.clone();
        let key_id = key.id;
        tokio::spawn(async move {
            if let Err(error) = store.record_usage(key_id, now).await {
                tracing::debug!(
                    key_id = %key_id,
                    error = %error,
                    "failed to record API key usage"
                );
            }
        });

        tracing::debug!(
            key_id = %key.id,
            organization_id = %key.organization_id,
            "API key authenticated"
        );

        Ok(AuthContext {
            organization_id: key.organization_id,
            scopes: key.scopes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_key::ApiKey;
    use crate::mocks::{ManualClock, MockApiKeyStore};
    use chrono::Duration;
    use trellis_core::scope::Scope;
    use uuid::Uuid;

    fn authenticator(
        store: &MockApiKeyStore,
        clock: &ManualClock,
    ) -> ApiKeyAuthenticator<MockApiKeyStore, ManualClock> {
        ApiKeyAuthenticator::new(store.clone(), clock.clone())
    }

    #[tokio::test]
    async fn valid_credential_resolves_to_context() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let organization_id = Uuid::new_v4();
        let (key, credential) =
            ApiKey::issue(organization_id, vec![Scope::Read, Scope::Write], None);
        store.insert(key);

        let context = authenticator(&store, &clock)
            .authenticate(&credential)
            .await
            .expect("valid credential");

        assert_eq!(context.organization_id, organization_id);
        assert!(context.has_scope(Scope::Read));
        assert!(!context.has_scope(Scope::Admin));
    }

    #[tokio::test]
    async fn missing_prefix_is_invalid_without_store_lookup() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();

        let err = authenticator(&store, &clock)
            .authenticate("sk_live_abcdef")
            .await
            .expect_err("bad prefix");

        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn unknown_credential_is_invalid() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();

        let err = authenticator(&store, &clock)
            .authenticate("trellis_does-not-exist")
            .await
            .expect_err("unknown key");

        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn revoked_key_is_rejected() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let (mut key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Read], None);
        key.is_active = false;
        store.insert(key);

        let err = authenticator(&store, &clock)
            .authenticate(&credential)
            .await
            .expect_err("revoked");

        assert_eq!(err, AuthError::KeyRevoked);
    }

    #[tokio::test]
    async fn expired_key_is_rejected_against_the_injected_clock() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let expires_at = clock.now() + Duration::hours(1);
        let (mut key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Read], None);
        key.expires_at = Some(expires_at);
        store.insert(key);

        let auth = authenticator(&store, &clock);
        assert!(auth.authenticate(&credential).await.is_ok());

        clock.advance(Duration::hours(2));
        let err = auth.authenticate(&credential).await.expect_err("expired");
        assert_eq!(err, AuthError::KeyExpired);
    }

    #[tokio::test]
    async fn usage_stamp_failure_does_not_fail_the_decision() {
        let store = MockApiKeyStore::new();
        store.fail_usage_recording();
        let clock = ManualClock::default();
        let (key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Admin], None);
        store.insert(key);

        let result = authenticator(&store, &clock).authenticate(&credential).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn successful_authentication_records_usage() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let (key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Read], None);
        let key_id = key.id;
        store.insert(key);

        authenticator(&store, &clock)
            .authenticate(&credential)
            .await
            .expect("valid credential");

        // The stamp is written from a detached task; yield until it lands.
        for _ in 0..50 {
            if !store.recorded_usage().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let usage = store.recorded_usage();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].0, key_id);
    }
}
