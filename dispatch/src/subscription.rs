//! Webhook subscriptions.
//!
//! A subscription is an organization-owned registration of a URL, a secret,
//! and the event kinds it wants pushed. The secret exists in two places
//! only: the internal [`WebhookSubscription`] record and the one creation
//! response. Read paths serialize [`SubscriptionView`], which has no secret
//! field at all, so a new call site cannot accidentally leak it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use trellis_core::event::EventKind;
use uuid::Uuid;

/// Number of random bytes behind a generated secret.
const SECRET_BYTES: usize = 32;

/// Internal subscription record. Carries the signing secret; never
/// serialized into a read response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    /// Subscription identifier.
    pub id: Uuid,
    /// Organization owning the subscription.
    pub organization_id: Uuid,
    /// Destination URL for deliveries.
    pub url: String,
    /// HMAC signing secret, write-once at creation.
    pub secret: String,
    /// Event kinds this subscription wants.
    pub subscribed_events: BTreeSet<EventKind>,
    /// Whether deliveries are attempted at all.
    pub is_active: bool,
    /// Consecutive failed deliveries since the last success.
    pub failure_count: u32,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// Last successful delivery, if any.
    pub last_triggered_at: Option<DateTime<Utc>>,
}

/// Public projection of a subscription: everything except the secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    /// Subscription identifier.
    pub id: Uuid,
    /// Organization owning the subscription.
    pub organization_id: Uuid,
    /// Destination URL for deliveries.
    pub url: String,
    /// Event kinds this subscription wants.
    pub subscribed_events: BTreeSet<EventKind>,
    /// Whether deliveries are attempted at all.
    pub is_active: bool,
    /// Consecutive failed deliveries since the last success.
    pub failure_count: u32,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
    /// Last successful delivery, if any.
    pub last_triggered_at: Option<DateTime<Utc>>,
}

impl From<&WebhookSubscription> for SubscriptionView {
    fn from(subscription: &WebhookSubscription) -> Self {
        Self {
            id: subscription.id,
            organization_id: subscription.organization_id,
            url: subscription.url.clone(),
            subscribed_events: subscription.subscribed_events.clone(),
            is_active: subscription.is_active,
            failure_count: subscription.failure_count,
            created_at: subscription.created_at,
            last_triggered_at: subscription.last_triggered_at,
        }
    }
}

/// Validation errors at subscription creation.
///
/// Unrecognized event kinds are rejected here, at creation time, never at
/// delivery time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The destination URL is empty.
    #[error("Subscription URL must not be empty")]
    EmptyUrl,

    /// No event kinds were requested.
    #[error("Subscription must name at least one event kind")]
    NoEvents,

    /// An event name is not in the recognized set.
    #[error("Unrecognized event kind: {0}")]
    UnrecognizedEvent(String),
}

/// Parameters for creating a subscription.
#[derive(Clone, Debug, Deserialize)]
pub struct NewSubscription {
    /// Destination URL for deliveries.
    pub url: String,
    /// Requested event kinds, by wire name.
    pub events: Vec<String>,
    /// Optional caller-supplied secret; generated server-side when absent.
    #[serde(default)]
    pub secret: Option<String>,
}

impl WebhookSubscription {
    /// Validate `params` and build the subscription record.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError`] when the URL is empty, no events are
    /// named, or an event name is outside the recognized set.
    pub fn create(
        organization_id: Uuid,
        params: NewSubscription,
    ) -> Result<Self, SubscriptionError> {
        if params.url.trim().is_empty() {
            return Err(SubscriptionError::EmptyUrl);
        }
        if params.events.is_empty() {
            return Err(SubscriptionError::NoEvents);
        }

        let mut subscribed_events = BTreeSet::new();
        for name in &params.events {
            let kind = name
                .parse::<EventKind>()
                .map_err(|_| SubscriptionError::UnrecognizedEvent(name.clone()))?;
            subscribed_events.insert(kind);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            organization_id,
            url: params.url,
            secret: params.secret.unwrap_or_else(generate_secret),
            subscribed_events,
            is_active: true,
            failure_count: 0,
            created_at: Utc::now(),
            last_triggered_at: None,
        })
    }

    /// Whether this subscription should receive `kind` right now.
    #[must_use]
    pub fn wants(&self, kind: EventKind) -> bool {
        self.is_active && self.subscribed_events.contains(&kind)
    }
}

/// Generate a random signing secret (32 bytes, base64url).
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("whsec_{}", URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(url: &str, events: &[&str]) -> NewSubscription {
        NewSubscription {
            url: url.to_string(),
            events: events.iter().map(ToString::to_string).collect(),
            secret: None,
        }
    }

    #[test]
    fn create_generates_a_secret_when_none_is_supplied() {
        let subscription = WebhookSubscription::create(
            Uuid::new_v4(),
            params("https://example.test/hook", &["status.changed"]),
        )
        .expect("valid params");

        assert!(subscription.secret.starts_with("whsec_"));
        assert!(subscription.is_active);
        assert_eq!(subscription.failure_count, 0);
    }

    #[test]
    fn caller_supplied_secret_is_kept() {
        let mut p = params("https://example.test/hook", &["vote.cast"]);
        p.secret = Some("whsec_fixed".to_string());
        let subscription =
            WebhookSubscription::create(Uuid::new_v4(), p).expect("valid params");
        assert_eq!(subscription.secret, "whsec_fixed");
    }

    #[test]
    fn empty_url_and_empty_events_are_rejected() {
        assert_eq!(
            WebhookSubscription::create(Uuid::new_v4(), params("  ", &["vote.cast"])),
            Err(SubscriptionError::EmptyUrl)
        );
        assert_eq!(
            WebhookSubscription::create(Uuid::new_v4(), params("https://example.test", &[])),
            Err(SubscriptionError::NoEvents)
        );
    }

    #[test]
    fn unrecognized_event_kind_is_rejected_at_creation() {
        let result = WebhookSubscription::create(
            Uuid::new_v4(),
            params("https://example.test", &["status.changed", "request.deleted"]),
        );
        assert_eq!(
            result,
            Err(SubscriptionError::UnrecognizedEvent(
                "request.deleted".to_string()
            ))
        );
    }

    #[test]
    fn view_has_no_secret_anywhere_in_its_serialized_form() {
        let mut p = params("https://example.test/hook", &["decision.made"]);
        p.secret = Some("whsec_super-private".to_string());
        let subscription =
            WebhookSubscription::create(Uuid::new_v4(), p).expect("valid params");

        let view = SubscriptionView::from(&subscription);
        let json = serde_json::to_string(&view).expect("serializes");
        assert!(!json.contains("super-private"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn wants_requires_active_and_subscribed() {
        let mut subscription = WebhookSubscription::create(
            Uuid::new_v4(),
            params("https://example.test", &["status.changed"]),
        )
        .expect("valid params");

        assert!(subscription.wants(EventKind::StatusChanged));
        assert!(!subscription.wants(EventKind::CommentAdded));

        subscription.is_active = false;
        assert!(!subscription.wants(EventKind::StatusChanged));
    }
}
