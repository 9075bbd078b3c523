//! In-app notification listing.

use crate::error::ApiError;
use crate::extractors::BearerToken;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use trellis_auth::providers::{ApiKeyStore, Clock};
use trellis_auth::RateLimiterStore;
use trellis_core::request_store::RequestStore;
use trellis_core::scope::Scope;
use trellis_dispatch::providers::{
    EmailSender, NotificationStore, RecipientDirectory, SubscriptionStore, WebhookTransport,
};
use uuid::Uuid;

/// Query parameters for notification listing.
#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    /// User whose notifications to list.
    pub recipient_id: Uuid,
}

/// List a recipient's in-app notifications, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/notifications?recipient_id=<uuid>
/// Authorization: Bearer trellis_…
/// ```
///
/// Requires `read` scope. Scoped to the authenticated organization.
pub async fn list_notifications<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    Query(query): Query<NotificationsQuery>,
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

    let notifications = state
        .notifications
        .list_for_recipient(context.organization_id, query.recipient_id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;

    Ok((rate_limit, Json(notifications)))
}
