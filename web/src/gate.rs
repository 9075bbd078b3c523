//! The admission gate: authenticate, then rate limit, then authorize.
//!
//! Every gated endpoint runs the same sequence: resolve the bearer
//! credential to an organization, charge the organization's token bucket,
//! then check the endpoint's required scope.
//! The resulting [`RateLimitHeaders`] ride on the response whether the
//! request succeeds or not.

use crate::error::{ApiError, RateLimitHeaders};
use trellis_auth::providers::{ApiKeyStore, Clock};
use trellis_auth::{ApiKeyAuthenticator, AuthContext, RateLimiterStore};
use trellis_core::scope::Scope;

/// Admission control for the API surface.
#[derive(Clone, Debug)]
pub struct AdmissionGate<K, C, L> {
    authenticator: ApiKeyAuthenticator<K, C>,
    limiter: L,
}

impl<K, C, L> AdmissionGate<K, C, L>
where
    K: ApiKeyStore + Clone + Send + Sync + 'static,
    C: Clock,
    L: RateLimiterStore,
{
    /// Create a gate over an authenticator and a rate limiter.
    pub const fn new(authenticator: ApiKeyAuthenticator<K, C>, limiter: L) -> Self {
        Self {
            authenticator,
            limiter,
        }
    }

    /// Admit or reject one API call.
    ///
    /// # Errors
    ///
    /// - `401 UNAUTHORIZED`: missing or invalid credential
    /// - `429 RATE_LIMITED`: the organization's bucket is exhausted; the
    ///   response carries `X-RateLimit-Reset` as the retry hint
    /// - `403 FORBIDDEN`: authenticated but lacking `required`
    pub async fn admit(
        &self,
        credential: Option<&str>,
        required: Scope,
    ) -> Result<(AuthContext, RateLimitHeaders), ApiError> {
        let credential =
            credential.ok_or_else(|| ApiError::unauthorized("Missing API credential"))?;

        let context = self.authenticator.authenticate(credential).await?;

        let decision = self
            .limiter
            .check(context.organization_id)
            .await
            .map_err(ApiError::from)?;
        let headers = RateLimitHeaders::from(&decision);

        if !decision.allowed {
            return Err(ApiError::rate_limited(headers));
        }

        if !context.has_scope(required) {
            return Err(
                ApiError::forbidden(format!("Insufficient scope: {required} required"))
                    .with_rate_limit(headers),
            );
        }

        Ok((context, headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::time::Duration;
    use trellis_auth::api_key::ApiKey;
    use trellis_auth::mocks::{ManualClock, MockApiKeyStore};
    use trellis_auth::{RateLimitConfig, TokenBucketLimiter};
    use uuid::Uuid;

    fn gate(
        store: &MockApiKeyStore,
        clock: &ManualClock,
        capacity: u32,
    ) -> AdmissionGate<MockApiKeyStore, ManualClock, TokenBucketLimiter<ManualClock>> {
        AdmissionGate::new(
            ApiKeyAuthenticator::new(store.clone(), clock.clone()),
            TokenBucketLimiter::new(
                RateLimitConfig::new()
                    .with_capacity(capacity)
                    .with_window(Duration::from_secs(60)),
                clock.clone(),
            ),
        )
    }

    #[tokio::test]
    async fn missing_credential_is_unauthorized_before_any_bucket_charge() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let gate = gate(&store, &clock, 1);

        let err = gate.admit(None, Scope::Read).await.expect_err("missing");
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn insufficient_scope_is_forbidden_and_still_charged() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let (key, credential) =
            ApiKey::issue(Uuid::new_v4(), vec![trellis_core::scope::Scope::Read], None);
        store.insert(key);
        let gate = gate(&store, &clock, 2);

        let err = gate
            .admit(Some(&credential), Scope::Admin)
            .await
            .expect_err("read key cannot admin");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        // The rejection happened after the bucket charge, so the headers
        // reflect it.
        assert_eq!(
            response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok()),
            Some("1")
        );
    }

    #[tokio::test]
    async fn exhausted_bucket_is_rate_limited_with_a_reset_hint() {
        let store = MockApiKeyStore::new();
        let clock = ManualClock::default();
        let (key, credential) =
            ApiKey::issue(Uuid::new_v4(), vec![trellis_core::scope::Scope::Admin], None);
        store.insert(key);
        let gate = gate(&store, &clock, 1);

        assert!(gate.admit(Some(&credential), Scope::Read).await.is_ok());

        let err = gate
            .admit(Some(&credential), Scope::Read)
            .await
            .expect_err("bucket exhausted");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("x-ratelimit-reset"));
    }
}
