//! Per-organization token-bucket rate limiting.
//!
//! The bucket algorithm is intentionally lossy: refill is continuous
//! (`floor(elapsed / window * capacity)`) relative to each bucket's own
//! `last_refill`, so a burst of checks inside the same millisecond sees the
//! same refill snapshot. Token counts stay in `[0, capacity]`.
//!
//! # Multi-instance deployments
//!
//! [`TokenBucketLimiter`] keeps its bucket map in process memory. Behind a
//! load balancer every instance enforces its own copy of the limit, so the
//! effective org-wide limit is `capacity × instances` unless routing pins
//! organizations to instances. Deployments that need the limit to hold
//! globally must implement [`RateLimiterStore`] against a shared,
//! atomically-updated counter store instead.

use crate::config::RateLimitConfig;
use crate::error::{AuthError, Result};
use crate::providers::Clock;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Outcome of one admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the call is admitted.
    pub allowed: bool,
    /// Configured capacity of the window.
    pub limit: u32,
    /// Tokens left after this check.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: DateTime<Utc>,
}

/// Admission control keyed by caller identity.
///
/// Keys are organization ids for API-key traffic.
pub trait RateLimiterStore: Send + Sync {
    /// Consume one token for `key` if any is available.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`] if the bucket store is
    /// unavailable. A rejected call is **not** an error; it is an
    /// `allowed: false` decision.
    fn check(&self, key: Uuid) -> impl Future<Output = Result<RateLimitDecision>> + Send;
}

/// One caller's bucket.
#[derive(Clone, Copy, Debug)]
struct TokenBucket {
    tokens: u32,
    last_refill: DateTime<Utc>,
}

/// Process-local token-bucket limiter.
///
/// Buckets are created with full capacity on first use and never persisted.
/// The read-refill-decrement sequence for a key runs as one critical
/// section, so two concurrent checks cannot both take the last token.
#[derive(Clone, Debug)]
pub struct TokenBucketLimiter<C> {
    config: RateLimitConfig,
    clock: C,
    buckets: Arc<Mutex<HashMap<Uuid, TokenBucket>>>,
}

impl<C: Clock> TokenBucketLimiter<C> {
    /// Create a limiter with the given config and clock.
    #[must_use]
    pub fn new(config: RateLimitConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The configured limits.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    #[allow(clippy::cast_possible_truncation)]
    fn window_ms(&self) -> i64 {
        // Windows are seconds-to-minutes scale; u128 -> i64 cannot truncate here.
        self.config.window.as_millis() as i64
    }

    fn decide(&self, key: Uuid, now: DateTime<Utc>) -> Result<RateLimitDecision> {
        let capacity = self.config.capacity;
        let window_ms = self.window_ms();

        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| AuthError::InternalError("bucket store mutex poisoned".into()))?;

        let bucket = buckets.entry(key).or_insert(TokenBucket {
            tokens: capacity,
            last_refill: now,
        });

        let elapsed_ms = (now - bucket.last_refill).num_milliseconds();
        if elapsed_ms >= window_ms {
            bucket.tokens = capacity;
            bucket.last_refill = now;
        } else if elapsed_ms > 0 {
            #[allow(clippy::cast_sign_loss)]
            let refill = (elapsed_ms * i64::from(capacity) / window_ms) as u32;
            if refill > 0 {
                bucket.tokens = bucket.tokens.saturating_add(refill).min(capacity);
                bucket.last_refill = now;
            }
        }

        let reset_at = bucket.last_refill + ChronoDuration::milliseconds(window_ms);

        if bucket.tokens == 0 {
            tracing::warn!(
                key = %key,
                limit = capacity,
                "rate limit exceeded"
            );
            return Ok(RateLimitDecision {
                allowed: false,
                limit: capacity,
                remaining: 0,
                reset_at,
            });
        }

        bucket.tokens -= 1;
        Ok(RateLimitDecision {
            allowed: true,
            limit: capacity,
            remaining: bucket.tokens,
            reset_at,
        })
    }
}

impl<C: Clock> RateLimiterStore for TokenBucketLimiter<C> {
    async fn check(&self, key: Uuid) -> Result<RateLimitDecision> {
        let now = self.clock.now();
        self.decide(key, now)
    }
}
