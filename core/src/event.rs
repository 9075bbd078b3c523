//! Domain events and the outbound webhook envelope.
//!
//! Events are facts: once produced they are never mutated. The recognized
//! event kinds form a closed set; anything else is rejected when a webhook
//! subscription is created, never at delivery time.

use crate::status::FeatureRequestStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of domain events that can be pushed to consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A feature request was created.
    #[serde(rename = "request.created")]
    RequestCreated,
    /// A feature request moved to a new workflow status.
    #[serde(rename = "status.changed")]
    StatusChanged,
    /// A reviewer approved, rejected, or deferred a request.
    #[serde(rename = "decision.made")]
    DecisionMade,
    /// A comment was added to a request.
    #[serde(rename = "comment.added")]
    CommentAdded,
    /// An assessment of a request was completed.
    #[serde(rename = "assessment.completed")]
    AssessmentCompleted,
    /// A stakeholder cast a vote on a request.
    #[serde(rename = "vote.cast")]
    VoteCast,
}

impl EventKind {
    /// Every recognized event kind.
    pub const ALL: [Self; 6] = [
        Self::RequestCreated,
        Self::StatusChanged,
        Self::DecisionMade,
        Self::CommentAdded,
        Self::AssessmentCompleted,
        Self::VoteCast,
    ];

    /// Wire representation of the event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestCreated => "request.created",
            Self::StatusChanged => "status.changed",
            Self::DecisionMade => "decision.made",
            Self::CommentAdded => "comment.added",
            Self::AssessmentCompleted => "assessment.completed",
            Self::VoteCast => "vote.cast",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized event kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// An accepted status transition, recorded as an immutable fact.
///
/// Produced exactly once per accepted transition by
/// [`crate::workflow::transition_event`] and consumed by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// The feature request that changed.
    pub request_id: uuid::Uuid,
    /// Organization owning the request.
    pub organization_id: uuid::Uuid,
    /// Status before the transition.
    pub from: FeatureRequestStatus,
    /// Status after the transition.
    pub to: FeatureRequestStatus,
    /// Who requested the transition.
    pub actor_id: uuid::Uuid,
    /// When the transition was accepted.
    pub occurred_at: DateTime<Utc>,
}

impl TransitionEvent {
    /// JSON payload carried inside the webhook envelope for this event.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "request_id": self.request_id,
            "organization_id": self.organization_id,
            "from_status": self.from,
            "to_status": self.to,
            "actor_id": self.actor_id,
            "occurred_at": self.occurred_at,
        })
    }
}

/// The body POSTed to webhook subscribers.
///
/// The serialized bytes of this envelope are exactly what gets signed;
/// signing and sending must use the same byte sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Unique delivery id, fresh per dispatch.
    pub id: uuid::Uuid,
    /// Which event this envelope carries.
    pub event: EventKind,
    /// Event-specific payload.
    pub payload: serde_json::Value,
    /// When the envelope was produced.
    pub timestamp: DateTime<Utc>,
}

impl WebhookEnvelope {
    /// Build an envelope for `event` with a fresh id and current timestamp.
    #[must_use]
    pub fn new(event: EventKind, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            event,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Canonical body bytes: what gets signed and what gets POSTed.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if the payload cannot be serialized.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
