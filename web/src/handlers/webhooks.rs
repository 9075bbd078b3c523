//! Webhook subscription management.
//!
//! Listing requires `read`; everything that mutates requires `admin`. Read
//! responses serialize [`SubscriptionView`]; the secret appears exactly
//! once, in the creation response.

use crate::error::ApiError;
use crate::extractors::BearerToken;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use trellis_auth::providers::{ApiKeyStore, Clock};
use trellis_auth::RateLimiterStore;
use trellis_core::request_store::RequestStore;
use trellis_core::scope::Scope;
use trellis_dispatch::providers::{
    EmailSender, NotificationStore, RecipientDirectory, SubscriptionStore, WebhookTransport,
};
use trellis_dispatch::{NewSubscription, SubscriptionView, WebhookSubscription};
use uuid::Uuid;

/// Creation response: the public view plus the secret, returned this once.
#[derive(Debug, Serialize)]
pub struct CreatedSubscription {
    /// The created subscription.
    #[serde(flatten)]
    pub subscription: SubscriptionView,
    /// Signing secret. Not retrievable again.
    pub secret: String,
}

/// List the organization's webhook subscriptions.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/webhooks
/// Authorization: Bearer trellis_…
/// ```
///
/// Requires `read` scope. Secrets are never included.
pub async fn list_subscriptions<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, ApiError>
where
    K: ApiKeyStore + Clone + 'static,
    C: Clock + 'static,
    L: RateLimiterStore + 'static,
    Q: RequestStore + 'static,
    S: SubscriptionStore + Clone + 'static,
    N: NotificationStore + Clone + 'static,
    R: RecipientDirectory + Clone + 'static,
    E: EmailSender + Clone + 'static,
    T: WebhookTransport + Clone + 'static,
{
    let (context, rate_limit) = state.gate.admit(bearer.0.as_deref(), Scope::Read).await?;

    let subscriptions = state
        .subscriptions
        .list_for_org(context.organization_id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;
    let views: Vec<SubscriptionView> = subscriptions.iter().map(SubscriptionView::from).collect();

    Ok((rate_limit, Json(views)))
}

/// Register a webhook subscription.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/webhooks
/// Authorization: Bearer trellis_…
/// Content-Type: application/json
///
/// {"url": "https://example.com/hook", "events": ["status.changed"]}
/// ```
///
/// Requires `admin` scope. The URL must be non-empty and every event must
/// be in the recognized set; a secret is generated server-side when none is
/// supplied. Responds `201` with the record including the secret; the only
/// time it is ever returned.
pub async fn create_subscription<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    bearer: BearerToken,
    Json(params): Json<NewSubscription>,
) -> Result<impl IntoResponse, ApiError>
where
    K: ApiKeyStore + Clone + 'static,
    C: Clock + 'static,
    L: RateLimiterStore + 'static,
    Q: RequestStore + 'static,
    S: SubscriptionStore + Clone + 'static,
    N: NotificationStore + Clone + 'static,
    R: RecipientDirectory + Clone + 'static,
    E: EmailSender + Clone + 'static,
    T: WebhookTransport + Clone + 'static,
{
    let (context, rate_limit) = state.gate.admit(bearer.0.as_deref(), Scope::Admin).await?;

    let subscription = WebhookSubscription::create(context.organization_id, params)
        .map_err(|e| ApiError::validation(e.to_string()).with_rate_limit(rate_limit))?;
    state
        .subscriptions
        .create(subscription.clone())
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;

    tracing::info!(
        subscription_id = %subscription.id,
        organization_id = %context.organization_id,
        "webhook subscription created"
    );

    let body = CreatedSubscription {
        subscription: SubscriptionView::from(&subscription),
        secret: subscription.secret,
    };
    Ok((StatusCode::CREATED, rate_limit, Json(body)))
}

/// Explicitly reactivate a deactivated subscription.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/webhooks/:id/reactivate
/// ```
///
/// Requires `admin` scope. Resets the failure count; this is the only path
/// back from automatic deactivation.
pub async fn reactivate_subscription<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    Path(id): Path<Uuid>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, ApiError>
where
    K: ApiKeyStore + Clone + 'static,
    C: Clock + 'static,
    L: RateLimiterStore + 'static,
    Q: RequestStore + 'static,
    S: SubscriptionStore + Clone + 'static,
    N: NotificationStore + Clone + 'static,
    R: RecipientDirectory + Clone + 'static,
    E: EmailSender + Clone + 'static,
    T: WebhookTransport + Clone + 'static,
{
    let (context, rate_limit) = state.gate.admit(bearer.0.as_deref(), Scope::Admin).await?;

    let subscription = state
        .subscriptions
        .get(id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?
        .filter(|s| s.organization_id == context.organization_id)
        .ok_or_else(|| {
            ApiError::not_found("Webhook subscription", id).with_rate_limit(rate_limit)
        })?;

    state
        .subscriptions
        .reactivate(subscription.id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;

    let reactivated = state
        .subscriptions
        .get(id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?
        .ok_or_else(|| {
            ApiError::not_found("Webhook subscription", id).with_rate_limit(rate_limit)
        })?;

    Ok((rate_limit, Json(SubscriptionView::from(&reactivated))))
}

/// Deactivate a subscription.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/v1/webhooks/:id
/// ```
///
/// Requires `admin` scope.
pub async fn delete_subscription<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    Path(id): Path<Uuid>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, ApiError>
where
    K: ApiKeyStore + Clone + 'static,
    C: Clock + 'static,
    L: RateLimiterStore + 'static,
    Q: RequestStore + 'static,
    S: SubscriptionStore + Clone + 'static,
    N: NotificationStore + Clone + 'static,
    R: RecipientDirectory + Clone + 'static,
    E: EmailSender + Clone + 'static,
    T: WebhookTransport + Clone + 'static,
{
    let (context, rate_limit) = state.gate.admit(bearer.0.as_deref(), Scope::Admin).await?;

    let subscription = state
        .subscriptions
        .get(id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?
        .filter(|s| s.organization_id == context.organization_id)
        .ok_or_else(|| {
            ApiError::not_found("Webhook subscription", id).with_rate_limit(rate_limit)
        })?;

    state
        .subscriptions
        .deactivate(subscription.id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;

    Ok((StatusCode::NO_CONTENT, rate_limit, ()))
}
