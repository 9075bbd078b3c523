//! API router composition.
//!
//! Composes all handlers into a single Axum router, with correlation-id
//! tracking layered over everything. `/health` is the only route outside
//! the admission gate.

use crate::handlers::{health, notifications, requests, webhooks};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use trellis_auth::providers::{ApiKeyStore, Clock};
use trellis_auth::RateLimiterStore;
use trellis_core::request_store::RequestStore;
use trellis_dispatch::providers::{
    EmailSender, NotificationStore, RecipientDirectory, SubscriptionStore, WebhookTransport,
};

/// Create the API router.
///
/// # Routes
///
/// - `GET  /health`: liveness, ungated
/// - `GET  /api/v1/webhooks`: list subscriptions (`read`)
/// - `POST /api/v1/webhooks`: create subscription (`admin`)
/// - `DELETE /api/v1/webhooks/:id`: deactivate subscription (`admin`)
/// - `POST /api/v1/webhooks/:id/reactivate`: reactivate (`admin`)
/// - `GET  /api/v1/notifications`: list notifications (`read`)
/// - `POST /api/v1/requests`: create feature request (`write`)
/// - `POST /api/v1/requests/:id/transition`: status transition (`write`)
pub fn api_router<K, C, L, Q, S, N, R, E, T>(
    state: Arc<AppState<K, C, L, Q, S, N, R, E, T>>,
) -> Router
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
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/webhooks",
            get(webhooks::list_subscriptions::<K, C, L, Q, S, N, R, E, T>)
                .post(webhooks::create_subscription::<K, C, L, Q, S, N, R, E, T>),
        )
        .route(
            "/api/v1/webhooks/:id",
            delete(webhooks::delete_subscription::<K, C, L, Q, S, N, R, E, T>),
        )
        .route(
            "/api/v1/webhooks/:id/reactivate",
            post(webhooks::reactivate_subscription::<K, C, L, Q, S, N, R, E, T>),
        )
        .route(
            "/api/v1/notifications",
            get(notifications::list_notifications::<K, C, L, Q, S, N, R, E, T>),
        )
        .route(
            "/api/v1/requests",
            post(requests::create_request::<K, C, L, Q, S, N, R, E, T>),
        )
        .route(
            "/api/v1/requests/:id/transition",
            post(requests::transition_request::<K, C, L, Q, S, N, R, E, T>),
        )
        .layer(correlation_id_layer())
        .with_state(state)
}
