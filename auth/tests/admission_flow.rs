//! Integration tests for the full admission path: credential → context →
//! bucket check, the way the web layer drives it.

use chrono::Duration;
use std::time::Duration as StdDuration;
use trellis_auth::api_key::ApiKey;
use trellis_auth::mocks::{ManualClock, MockApiKeyStore};
use trellis_auth::{
    ApiKeyAuthenticator, AuthError, RateLimitConfig, RateLimiterStore, TokenBucketLimiter,
};
use trellis_core::scope::{has_scope, Scope};
use uuid::Uuid;

#[tokio::test]
async fn authenticated_org_is_rate_limited_per_organization() {
    let store = MockApiKeyStore::new();
    let clock = ManualClock::default();
    let (key, credential) = ApiKey::issue(Uuid::new_v4(), vec![Scope::Write], None);
    store.insert(key);

    let authenticator = ApiKeyAuthenticator::new(store, clock.clone());
    let limiter = TokenBucketLimiter::new(
        RateLimitConfig::new()
            .with_capacity(3)
            .with_window(StdDuration::from_secs(60)),
        clock.clone(),
    );

    let context = authenticator
        .authenticate(&credential)
        .await
        .expect("valid credential");

    for _ in 0..3 {
        let decision = limiter
            .check(context.organization_id)
            .await
            .expect("bucket check");
        assert!(decision.allowed);
    }

    let rejected = limiter
        .check(context.organization_id)
        .await
        .expect("bucket check");
    assert!(!rejected.allowed);
    assert_eq!(rejected.remaining, 0);

    // The retry hint points at the window reset; after it, calls flow again.
    clock.set(rejected.reset_at + Duration::milliseconds(1));
    let decision = limiter
        .check(context.organization_id)
        .await
        .expect("bucket check");
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2);
}

#[tokio::test]
async fn a_rejected_credential_never_reaches_the_bucket() {
    let store = MockApiKeyStore::new();
    let clock = ManualClock::default();
    let authenticator = ApiKeyAuthenticator::new(store, clock.clone());
    let limiter = TokenBucketLimiter::new(RateLimitConfig::default(), clock);

    let err = authenticator
        .authenticate("trellis_unknown")
        .await
        .expect_err("unknown credential");
    assert_eq!(err, AuthError::InvalidCredentials);

    // No bucket was touched for the failed caller: a fresh org still sees a
    // full window.
    let decision = limiter.check(Uuid::new_v4()).await.expect("bucket check");
    assert_eq!(decision.remaining, decision.limit - 1);
}

#[test]
fn scope_hierarchy_vectors() {
    assert!(has_scope(&[Scope::Admin], Scope::Read));
    assert!(!has_scope(&[Scope::Write], Scope::Admin));
    assert!(!has_scope(&[Scope::Read], Scope::Write));
    assert!(has_scope(&[Scope::Write], Scope::Read));
}
