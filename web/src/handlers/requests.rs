//! Feature request intake and status transitions.
//!
//! The transition endpoint is the trigger of the event distribution core:
//! workflow validation happens against the stored status, the mutation is
//! persisted, and the dispatcher fans the resulting event out without
//! blocking the response.

use crate::error::ApiError;
use crate::extractors::BearerToken;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trellis_auth::providers::{ApiKeyStore, Clock};
use trellis_auth::RateLimiterStore;
use trellis_core::event::EventKind;
use trellis_core::request_store::{FeatureRequest, RequestStore};
use trellis_core::scope::Scope;
use trellis_core::status::FeatureRequestStatus;
use trellis_core::workflow::transition_event;
use trellis_dispatch::providers::{
    EmailSender, NotificationStore, RecipientDirectory, SubscriptionStore, WebhookTransport,
};
use uuid::Uuid;

/// Body for creating a feature request.
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// Short human-readable title.
    pub title: String,
}

/// Body for requesting a status transition.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    /// Status the caller wants the request moved to.
    pub target_status: FeatureRequestStatus,
    /// User performing the transition; defaults to the organization itself
    /// for machine-to-machine callers.
    #[serde(default)]
    pub actor_id: Option<Uuid>,
}

/// Response for an accepted transition.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    /// The feature request that changed.
    pub request_id: Uuid,
    /// Status before the transition.
    pub from: FeatureRequestStatus,
    /// Status after the transition.
    pub to: FeatureRequestStatus,
    /// When the transition was accepted.
    pub occurred_at: DateTime<Utc>,
}

/// Create a feature request in `draft`.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/requests
/// Authorization: Bearer trellis_…
/// Content-Type: application/json
///
/// {"title": "Bulk CSV import"}
/// ```
///
/// Requires `write` scope. Dispatches `request.created`.
pub async fn create_request<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    bearer: BearerToken,
    Json(body): Json<CreateRequestBody>,
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
    let (context, rate_limit) = state.gate.admit(bearer.0.as_deref(), Scope::Write).await?;

    if body.title.trim().is_empty() {
        return Err(ApiError::validation("Title must not be empty").with_rate_limit(rate_limit));
    }

    let request = FeatureRequest::new(context.organization_id, body.title);
    state
        .requests
        .create(request.clone())
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;

    state.dispatcher.dispatch(
        context.organization_id,
        EventKind::RequestCreated,
        serde_json::json!({
            "request_id": request.id,
            "title": request.title,
            "status": request.status,
        }),
    );

    Ok((StatusCode::CREATED, rate_limit, Json(request)))
}

/// Move a feature request to a new workflow status.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/requests/:id/transition
/// Authorization: Bearer trellis_…
/// Content-Type: application/json
///
/// {"target_status": "approved"}
/// ```
///
/// Requires `write` scope. Legality is evaluated against the stored status;
/// an illegal transition (including a re-submission of the current status)
/// responds `409 ILLEGAL_TRANSITION` with the offending pair and mutates
/// nothing. An accepted transition dispatches `status.changed`, plus
/// `decision.made` when the new status is a review decision.
pub async fn transition_request<K, C, L, Q, S, N, R, E, T>(
    State(state): State<Arc<AppState<K, C, L, Q, S, N, R, E, T>>>,
    Path(id): Path<Uuid>,
    bearer: BearerToken,
    Json(body): Json<TransitionBody>,
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
    let (context, rate_limit) = state.gate.admit(bearer.0.as_deref(), Scope::Write).await?;

    let request = state
        .requests
        .get(id)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?
        .filter(|r| r.organization_id == context.organization_id)
        .ok_or_else(|| ApiError::not_found("Feature request", id).with_rate_limit(rate_limit))?;

    let actor_id = body.actor_id.unwrap_or(context.organization_id);
    let event = transition_event(
        request.id,
        context.organization_id,
        actor_id,
        request.status,
        body.target_status,
    )
    .map_err(|rejected| {
        ApiError::conflict(rejected.to_string(), "ILLEGAL_TRANSITION").with_rate_limit(rate_limit)
    })?;

    state
        .requests
        .set_status(request.id, event.to)
        .await
        .map_err(|e| ApiError::from(e).with_rate_limit(rate_limit))?;

    tracing::info!(
        request_id = %event.request_id,
        from = %event.from,
        to = %event.to,
        "status transition accepted"
    );

    state.dispatcher.dispatch(
        context.organization_id,
        EventKind::StatusChanged,
        event.to_payload(),
    );
    if matches!(
        event.to,
        FeatureRequestStatus::Approved
            | FeatureRequestStatus::Rejected
            | FeatureRequestStatus::Deferred
    ) {
        state.dispatcher.dispatch(
            context.organization_id,
            EventKind::DecisionMade,
            event.to_payload(),
        );
    }

    Ok((
        rate_limit,
        Json(TransitionResponse {
            request_id: event.request_id,
            from: event.from,
            to: event.to,
            occurred_at: event.occurred_at,
        }),
    ))
}
