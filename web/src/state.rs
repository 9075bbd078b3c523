//! Application state for Axum handlers.

use crate::gate::AdmissionGate;
use trellis_dispatch::EventDispatcher;

/// Application state shared across all HTTP handlers.
///
/// Generic over the provider set so production and tests wire different
/// implementations through the same handlers. Handlers receive it as
/// `State<Arc<AppState<…>>>`.
///
/// Type parameters:
///
/// - `K`: API key store
/// - `C`: clock
/// - `L`: rate limiter store
/// - `Q`: feature request store
/// - `S`: webhook subscription store
/// - `N`: notification store
/// - `R`: recipient directory
/// - `E`: email sender
/// - `T`: webhook transport
pub struct AppState<K, C, L, Q, S, N, R, E, T> {
    /// Admission control: authenticate → rate limit → authorize.
    pub gate: AdmissionGate<K, C, L>,
    /// Feature request persistence.
    pub requests: Q,
    /// Webhook subscription persistence (shared with the dispatcher).
    pub subscriptions: S,
    /// In-app notification persistence (shared with the dispatcher).
    pub notifications: N,
    /// Event fan-out.
    pub dispatcher: EventDispatcher<S, N, R, E, T>,
}

impl<K, C, L, Q, S, N, R, E, T> AppState<K, C, L, Q, S, N, R, E, T> {
    /// Assemble the application state.
    pub const fn new(
        gate: AdmissionGate<K, C, L>,
        requests: Q,
        subscriptions: S,
        notifications: N,
        dispatcher: EventDispatcher<S, N, R, E, T>,
    ) -> Self {
        Self {
            gate,
            requests,
            subscriptions,
            notifications,
            dispatcher,
        }
    }
}
