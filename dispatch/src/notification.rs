//! In-app notifications and their recipients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trellis_core::event::EventKind;
use uuid::Uuid;

/// A persisted in-app notification for one recipient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier.
    pub id: Uuid,
    /// Organization the notification belongs to.
    pub organization_id: Uuid,
    /// User the notification is addressed to.
    pub recipient_id: Uuid,
    /// The event that produced it.
    pub event: EventKind,
    /// Event payload, as carried by the webhook envelope.
    pub payload: serde_json::Value,
    /// When the notification was produced.
    pub created_at: DateTime<Utc>,
    /// When the recipient read it, if they have.
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Build an unread notification for `recipient_id`.
    #[must_use]
    pub fn new(
        organization_id: Uuid,
        recipient_id: Uuid,
        event: EventKind,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            recipient_id,
            event,
            payload,
            created_at: Utc::now(),
            read_at: None,
        }
    }
}

/// Someone who should hear about an event.
///
/// Resolved per `(organization, event kind)` by the recipient directory;
/// recipients without an email address still get in-app notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// User identifier.
    pub user_id: Uuid,
    /// Display name, used in email salutations.
    pub display_name: String,
    /// Email address, when the user has one on file.
    pub email: Option<String>,
}
