//! In-memory providers.
//!
//! Reference implementations used by tests and single-process deployments.
//! Production replaces the stores with SQL-backed implementations.

use crate::error::{DispatchError, Result};
use crate::notification::{Notification, Recipient};
use crate::providers::{NotificationStore, RecipientDirectory, SubscriptionStore};
use crate::subscription::WebhookSubscription;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use trellis_core::event::EventKind;
use uuid::Uuid;

fn store_poisoned<T>(_: T) -> DispatchError {
    DispatchError::Store("mutex poisoned".into())
}

/// In-memory subscription store.
#[derive(Clone, Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: Arc<Mutex<HashMap<Uuid, WebhookSubscription>>>,
}

impl InMemorySubscriptionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(&self, subscription: WebhookSubscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        subscriptions.insert(subscription.id, subscription);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<WebhookSubscription>> {
        let subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        Ok(subscriptions.get(&id).cloned())
    }

    async fn list_for_org(&self, organization_id: Uuid) -> Result<Vec<WebhookSubscription>> {
        let subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        let mut matching: Vec<_> = subscriptions
            .values()
            .filter(|s| s.organization_id == organization_id)
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.created_at);
        Ok(matching)
    }

    async fn active_subscribed(
        &self,
        organization_id: Uuid,
        kind: EventKind,
    ) -> Result<Vec<WebhookSubscription>> {
        let subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        Ok(subscriptions
            .values()
            .filter(|s| s.organization_id == organization_id && s.wants(kind))
            .cloned()
            .collect())
    }

    async fn record_success(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        let subscription = subscriptions
            .get_mut(&id)
            .ok_or(DispatchError::SubscriptionNotFound(id))?;
        subscription.failure_count = 0;
        subscription.last_triggered_at = Some(at);
        Ok(())
    }

    async fn record_failure(&self, id: Uuid) -> Result<u32> {
        let mut subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        let subscription = subscriptions
            .get_mut(&id)
            .ok_or(DispatchError::SubscriptionNotFound(id))?;
        subscription.failure_count = subscription.failure_count.saturating_add(1);
        Ok(subscription.failure_count)
    }

    async fn deactivate(&self, id: Uuid) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        let subscription = subscriptions
            .get_mut(&id)
            .ok_or(DispatchError::SubscriptionNotFound(id))?;
        subscription.is_active = false;
        Ok(())
    }

    async fn reactivate(&self, id: Uuid) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock().map_err(store_poisoned)?;
        let subscription = subscriptions
            .get_mut(&id)
            .ok_or(DispatchError::SubscriptionNotFound(id))?;
        subscription.is_active = true;
        subscription.failure_count = 0;
        Ok(())
    }
}

/// In-memory notification store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryNotificationStore {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored notification, in insertion order. Test convenience.
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    async fn append(&self, notification: Notification) -> Result<()> {
        let mut notifications = self.notifications.lock().map_err(store_poisoned)?;
        notifications.push(notification);
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        organization_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Vec<Notification>> {
        let notifications = self.notifications.lock().map_err(store_poisoned)?;
        let mut matching: Vec<_> = notifications
            .iter()
            .filter(|n| n.organization_id == organization_id && n.recipient_id == recipient_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

/// In-memory recipient directory.
///
/// Production resolves recipients from team membership and per-user
/// notification preferences; here they are registered directly.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecipientDirectory {
    recipients: Arc<Mutex<HashMap<Uuid, Vec<Recipient>>>>,
}

impl InMemoryRecipientDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipient for every event kind in `organization_id`.
    pub fn add(&self, organization_id: Uuid, recipient: Recipient) {
        if let Ok(mut recipients) = self.recipients.lock() {
            recipients.entry(organization_id).or_default().push(recipient);
        }
    }
}

impl RecipientDirectory for InMemoryRecipientDirectory {
    async fn recipients_for(
        &self,
        organization_id: Uuid,
        _kind: EventKind,
    ) -> Result<Vec<Recipient>> {
        let recipients = self.recipients.lock().map_err(store_poisoned)?;
        Ok(recipients.get(&organization_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{NewSubscription, WebhookSubscription};

    fn subscription(organization_id: Uuid, events: &[&str]) -> WebhookSubscription {
        WebhookSubscription::create(
            organization_id,
            NewSubscription {
                url: "https://example.test/hook".to_string(),
                events: events.iter().map(ToString::to_string).collect(),
                secret: None,
            },
        )
        .expect("valid params")
    }

    #[tokio::test]
    async fn active_subscribed_filters_on_org_kind_and_activity() {
        let store = InMemorySubscriptionStore::new();
        let org = Uuid::new_v4();

        let wanted = subscription(org, &["status.changed"]);
        let other_kind = subscription(org, &["comment.added"]);
        let other_org = subscription(Uuid::new_v4(), &["status.changed"]);
        let mut inactive = subscription(org, &["status.changed"]);
        inactive.is_active = false;

        for s in [&wanted, &other_kind, &other_org, &inactive] {
            store.create(s.clone()).await.expect("create");
        }

        let matching = store
            .active_subscribed(org, EventKind::StatusChanged)
            .await
            .expect("query");
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, wanted.id);
    }

    #[tokio::test]
    async fn failure_count_increments_and_success_resets() {
        let store = InMemorySubscriptionStore::new();
        let sub = subscription(Uuid::new_v4(), &["vote.cast"]);
        let id = sub.id;
        store.create(sub).await.expect("create");

        assert_eq!(store.record_failure(id).await.expect("failure"), 1);
        assert_eq!(store.record_failure(id).await.expect("failure"), 2);

        store.record_success(id, Utc::now()).await.expect("success");
        let stored = store.get(id).await.expect("get").expect("present");
        assert_eq!(stored.failure_count, 0);
        assert!(stored.last_triggered_at.is_some());

        assert_eq!(store.record_failure(id).await.expect("failure"), 1);
    }

    #[tokio::test]
    async fn reactivate_resumes_with_a_clean_slate() {
        let store = InMemorySubscriptionStore::new();
        let sub = subscription(Uuid::new_v4(), &["vote.cast"]);
        let id = sub.id;
        store.create(sub).await.expect("create");

        for _ in 0..3 {
            store.record_failure(id).await.expect("failure");
        }
        store.deactivate(id).await.expect("deactivate");
        assert!(!store.get(id).await.expect("get").expect("present").is_active);

        store.reactivate(id).await.expect("reactivate");
        let stored = store.get(id).await.expect("get").expect("present");
        assert!(stored.is_active);
        assert_eq!(stored.failure_count, 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = InMemorySubscriptionStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.record_failure(id).await,
            Err(DispatchError::SubscriptionNotFound(id))
        );
    }
}
