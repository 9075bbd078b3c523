//! Provider traits for the dispatcher's collaborators.

use crate::error::Result;
use crate::notification::{Notification, Recipient};
use crate::subscription::WebhookSubscription;
use chrono::{DateTime, Utc};
use std::future::Future;
use trellis_core::event::EventKind;
use uuid::Uuid;

/// Store for webhook subscriptions.
///
/// Failure accounting lives here so that multiple dispatcher instances
/// sharing one store converge on the same counts.
pub trait SubscriptionStore: Send + Sync {
    /// Persist a new subscription.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the store is unavailable.
    fn create(
        &self,
        subscription: WebhookSubscription,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch one subscription by id.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the store is unavailable.
    fn get(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<WebhookSubscription>>> + Send;

    /// Every subscription owned by `organization_id`, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the store is unavailable.
    fn list_for_org(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = Result<Vec<WebhookSubscription>>> + Send;

    /// Active subscriptions of `organization_id` subscribed to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the store is unavailable.
    fn active_subscribed(
        &self,
        organization_id: Uuid,
        kind: EventKind,
    ) -> impl Future<Output = Result<Vec<WebhookSubscription>>> + Send;

    /// Record a successful delivery: reset the failure count to zero and
    /// stamp `last_triggered_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SubscriptionNotFound`](crate::error::DispatchError::SubscriptionNotFound)
    /// or [`DispatchError::Store`](crate::error::DispatchError::Store).
    fn record_success(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Record a failed delivery, returning the incremented failure count.
    ///
    /// The count only ever increases here; time alone never decrements it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SubscriptionNotFound`](crate::error::DispatchError::SubscriptionNotFound)
    /// or [`DispatchError::Store`](crate::error::DispatchError::Store).
    fn record_failure(&self, id: Uuid) -> impl Future<Output = Result<u32>> + Send;

    /// Stop all deliveries to a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SubscriptionNotFound`](crate::error::DispatchError::SubscriptionNotFound)
    /// or [`DispatchError::Store`](crate::error::DispatchError::Store).
    fn deactivate(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;

    /// Explicitly resume deliveries, resetting the failure count.
    ///
    /// This is the only path back from deactivation; nothing reactivates
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SubscriptionNotFound`](crate::error::DispatchError::SubscriptionNotFound)
    /// or [`DispatchError::Store`](crate::error::DispatchError::Store).
    fn reactivate(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;
}

/// Store for in-app notifications.
pub trait NotificationStore: Send + Sync {
    /// Persist one notification.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the store is unavailable.
    fn append(&self, notification: Notification) -> impl Future<Output = Result<()>> + Send;

    /// Notifications addressed to `recipient_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the store is unavailable.
    fn list_for_recipient(
        &self,
        organization_id: Uuid,
        recipient_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Notification>>> + Send;
}

/// Resolves who should hear about an event.
pub trait RecipientDirectory: Send + Sync {
    /// Recipients interested in `kind` within `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`](crate::error::DispatchError::Store)
    /// if the directory is unavailable.
    fn recipients_for(
        &self,
        organization_id: Uuid,
        kind: EventKind,
    ) -> impl Future<Output = Result<Vec<Recipient>>> + Send;
}

/// Performs the HTTP POST of one webhook delivery.
///
/// The transport owns the timeout: an attempt that exceeds it resolves to
/// [`DispatchError::Timeout`](crate::error::DispatchError::Timeout), it does
/// not hang the dispatch batch.
pub trait WebhookTransport: Send + Sync {
    /// POST `body` to `url` with the given signature header value.
    ///
    /// Returns the HTTP status code; the dispatcher decides what counts as
    /// success.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Timeout`](crate::error::DispatchError::Timeout)
    /// or [`DispatchError::Transport`](crate::error::DispatchError::Transport)
    /// when the POST does not complete.
    fn post(
        &self,
        url: &str,
        signature: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<u16>> + Send;
}
