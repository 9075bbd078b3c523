//! Custom Axum extractors.
//!
//! - [`BearerToken`]: the `Authorization: Bearer …` credential, if present
//! - [`CorrelationId`]: extract or generate request correlation IDs

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// Bearer credential from the `Authorization` header.
///
/// Extraction is infallible; the admission gate decides what a missing or
/// malformed credential means (it means 401).
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string);

        Ok(Self(token))
    }
}

/// Correlation ID for request tracing.
///
/// Extracts the correlation ID from the `X-Correlation-ID` header,
/// or generates a new UUID v4 if not present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .headers
            .get("X-Correlation-ID")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn bearer_from(value: Option<&str>) -> BearerToken {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        let request = builder.body(()).expect("request builds");
        let (mut parts, ()) = request.into_parts();
        BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect("infallible")
    }

    #[tokio::test]
    async fn bearer_token_is_stripped_from_the_header() {
        let token = bearer_from(Some("Bearer trellis_abc123")).await;
        assert_eq!(token.0.as_deref(), Some("trellis_abc123"));
    }

    #[tokio::test]
    async fn missing_or_non_bearer_authorization_yields_none() {
        assert!(bearer_from(None).await.0.is_none());
        assert!(bearer_from(Some("Basic dXNlcjpwYXNz")).await.0.is_none());
        assert!(bearer_from(Some("Bearer ")).await.0.is_none());
    }
}
