//! # Trellis Web
//!
//! Axum HTTP surface for the Trellis event distribution core.
//!
//! # Request flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Admission gate**: bearer credential → organization + scopes, then
//!    the organization's token bucket, then the endpoint's required scope
//! 3. **Domain decision**: workflow validation for mutations, pure and
//!    synchronous
//! 4. **Persist**, then hand the event to the dispatcher (fire-and-forget;
//!    the response never waits on fan-out)
//! 5. **Respond**, with `X-RateLimit-*` headers on every gated response
//!
//! Failures upstream of dispatch are loud and synchronous (401/403/409/422/
//! 429); everything inside dispatch is the dispatcher's own concern.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::{ApiError, RateLimitHeaders};
pub use extractors::{BearerToken, CorrelationId};
pub use gate::AdmissionGate;
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::api_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, ApiError>;
