//! Feature request status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status of a feature request.
///
/// Exactly one value is attached to a request at any time, and it is only
/// mutated through the workflow engine (see [`crate::workflow`]). The wire
/// form is `snake_case` (e.g. `under_review`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureRequestStatus {
    /// Request has been created but not yet submitted.
    Draft,
    /// Stakeholder is filling in intake details.
    IntakeInProgress,
    /// Intake is complete; waiting for an assessment.
    PendingAssessment,
    /// Assessment is done; a reviewer holds the request.
    UnderReview,
    /// Reviewer sent the request back for more information.
    NeedsInfo,
    /// Reviewer approved the request.
    Approved,
    /// Reviewer rejected the request. Terminal.
    Rejected,
    /// Reviewer deferred the decision.
    Deferred,
    /// Approved request queued in the delivery backlog.
    InBacklog,
    /// Delivery work has started.
    InProgress,
    /// Delivery is finished. Terminal.
    Completed,
}

impl FeatureRequestStatus {
    /// Every status value, in lifecycle order.
    pub const ALL: [Self; 11] = [
        Self::Draft,
        Self::IntakeInProgress,
        Self::PendingAssessment,
        Self::UnderReview,
        Self::NeedsInfo,
        Self::Approved,
        Self::Rejected,
        Self::Deferred,
        Self::InBacklog,
        Self::InProgress,
        Self::Completed,
    ];

    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::IntakeInProgress => "intake_in_progress",
            Self::PendingAssessment => "pending_assessment",
            Self::UnderReview => "under_review",
            Self::NeedsInfo => "needs_info",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Deferred => "deferred",
            Self::InBacklog => "in_backlog",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Whether this status has no outbound workflow edges.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }
}

impl fmt::Display for FeatureRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for FeatureRequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
