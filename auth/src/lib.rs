//! # Trellis Admission Control
//!
//! API-key authentication, scope authorization, and per-organization rate
//! limiting for the Trellis intake platform.
//!
//! Every inbound API call passes through two gates before it reaches a
//! handler:
//!
//! 1. [`authenticator::ApiKeyAuthenticator`] resolves the presented bearer
//!    credential to an organization and a scope set, or rejects it.
//! 2. A [`rate_limiter::RateLimiterStore`] admits or rejects the call
//!    against the organization's token bucket.
//!
//! Both depend only on provider traits ([`providers`]); tests run against
//! the in-memory doubles in [`mocks`] with a manually advanced clock.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api_key;
pub mod authenticator;
pub mod config;
pub mod error;
pub mod mocks;
pub mod providers;
pub mod rate_limiter;

// Re-export main types for convenience
pub use api_key::{ApiKey, AuthContext, CREDENTIAL_PREFIX};
pub use authenticator::ApiKeyAuthenticator;
pub use config::RateLimitConfig;
pub use error::{AuthError, Result};
pub use rate_limiter::{RateLimitDecision, RateLimiterStore, TokenBucketLimiter};
