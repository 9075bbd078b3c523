//! Error types for web handlers.
//!
//! [`ApiError`] bridges domain errors and HTTP responses, implementing
//! Axum's `IntoResponse`. Rate-limit metadata rides along so that 403 and
//! 429 responses carry the same `X-RateLimit-*` headers successful
//! responses do.

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, IntoResponseParts, Response, ResponseParts};
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use trellis_auth::{AuthError, RateLimitDecision};

/// `X-RateLimit-Limit` header name.
pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
/// `X-RateLimit-Remaining` header name.
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
/// `X-RateLimit-Reset` header name.
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Rate-limit headers attached to every gated response, success or failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Window capacity.
    pub limit: u32,
    /// Tokens left after this call.
    pub remaining: u32,
    /// Window reset, Unix seconds.
    pub reset: i64,
}

impl From<&RateLimitDecision> for RateLimitHeaders {
    fn from(decision: &RateLimitDecision) -> Self {
        Self {
            limit: decision.limit,
            remaining: decision.remaining,
            reset: decision.reset_at.timestamp(),
        }
    }
}

impl IntoResponseParts for RateLimitHeaders {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let headers = res.headers_mut();
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from(self.reset));
        Ok(res)
    }
}

/// Application error type for web handlers.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Rate-limit metadata, when the request got far enough to have any
    rate_limit: Option<RateLimitHeaders>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl ApiError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            rate_limit: None,
            source: None,
        }
    }

    /// Attach rate-limit headers to this error's response.
    #[must_use]
    pub const fn with_rate_limit(mut self, headers: RateLimitHeaders) -> Self {
        self.rate_limit = Some(headers);
        self
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error with a custom machine-readable code.
    #[must_use]
    pub fn conflict(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), code.into())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 429 Too Many Requests error carrying the retry hint.
    #[must_use]
    pub fn rate_limited(headers: RateLimitHeaders) -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded".to_string(),
            "RATE_LIMITED".to_string(),
        )
        .with_rate_limit(headers)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        match self.rate_limit {
            Some(headers) => (self.status, headers, axum::Json(body)).into_response(),
            None => (self.status, axum::Json(body)).into_response(),
        }
    }
}

impl From<trellis_core::RequestStoreError> for ApiError {
    fn from(err: trellis_core::RequestStoreError) -> Self {
        match err {
            trellis_core::RequestStoreError::NotFound(id) => Self::not_found("Feature request", id),
            trellis_core::RequestStoreError::Backend(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::anyhow!(err))
            }
        }
    }
}

impl From<trellis_dispatch::DispatchError> for ApiError {
    fn from(err: trellis_dispatch::DispatchError) -> Self {
        match err {
            trellis_dispatch::DispatchError::SubscriptionNotFound(id) => {
                Self::not_found("Webhook subscription", id)
            }
            _ => Self::internal("An internal error occurred").with_source(anyhow::anyhow!(err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => Self::unauthorized("Missing API credential"),
            AuthError::InvalidCredentials | AuthError::KeyRevoked | AuthError::KeyExpired => {
                Self::unauthorized(err.to_string())
            }
            AuthError::InsufficientScope { required } => {
                Self::forbidden(format!("Insufficient scope: {required} required"))
            }
            AuthError::InternalError(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::anyhow!(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_the_code() {
        let err = ApiError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn rate_limited_carries_the_machine_readable_code() {
        let headers = RateLimitHeaders {
            limit: 100,
            remaining: 0,
            reset: 1_700_000_000,
        };
        let err = ApiError::rate_limited(headers);
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.code, "RATE_LIMITED");
        assert_eq!(err.rate_limit, Some(headers));
    }

    #[test]
    fn auth_errors_map_to_the_documented_statuses() {
        let unauthorized = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);

        let forbidden = ApiError::from(AuthError::InsufficientScope {
            required: trellis_core::scope::Scope::Admin,
        });
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn rate_limit_headers_land_on_the_response() {
        let headers = RateLimitHeaders {
            limit: 100,
            remaining: 7,
            reset: 1_700_000_060,
        };
        let response = ApiError::rate_limited(headers).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("x-ratelimit-remaining"),
            Some(&HeaderValue::from_static("7"))
        );
        assert_eq!(
            response.headers().get("x-ratelimit-limit"),
            Some(&HeaderValue::from_static("100"))
        );
    }
}
