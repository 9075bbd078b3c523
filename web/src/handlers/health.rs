//! Health check endpoint.
//!
//! Used by load balancers and monitoring to verify the service is running.
//! Outside the admission gate: no auth, no rate limiting, no
//! dependency checks.

use axum::http::StatusCode;

/// Simple liveness probe.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_check_is_ok() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
