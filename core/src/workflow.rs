//! Workflow transition rules for feature requests.
//!
//! The workflow is a directed graph over [`FeatureRequestStatus`] values with
//! no self-loops. [`attempt_transition`] is a pure function over two enum
//! values: no I/O, no hidden state, no locking. Callers that need ordering
//! between successive transitions of the same request must serialize their
//! own calls; callers that want idempotent re-submission must special-case it
//! themselves, because `current == target` is rejected rather than silently
//! accepted.
//!
//! # Example
//!
//! ```
//! use trellis_core::status::FeatureRequestStatus;
//! use trellis_core::workflow::attempt_transition;
//!
//! assert!(attempt_transition(
//!     FeatureRequestStatus::UnderReview,
//!     FeatureRequestStatus::Approved,
//! )
//! .is_ok());
//!
//! let rejected = attempt_transition(
//!     FeatureRequestStatus::Draft,
//!     FeatureRequestStatus::Completed,
//! )
//! .unwrap_err();
//! assert_eq!(rejected.from, FeatureRequestStatus::Draft);
//! assert_eq!(rejected.to, FeatureRequestStatus::Completed);
//! ```

use crate::event::TransitionEvent;
use crate::status::FeatureRequestStatus;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

/// A requested transition that is not an edge of the workflow graph.
///
/// Carries the disallowed `(from, to)` pair so callers can surface it
/// verbatim. The transition was never partially applied and is never retried
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition: {from} -> {to}")]
pub struct TransitionRejected {
    /// Status the request currently holds.
    pub from: FeatureRequestStatus,
    /// Status the caller asked for.
    pub to: FeatureRequestStatus,
}

/// Legal target statuses reachable from `from`.
///
/// This table is the single authority for the workflow graph; everything
/// else derives from it. Terminal statuses return an empty slice.
#[must_use]
pub const fn allowed_targets(from: FeatureRequestStatus) -> &'static [FeatureRequestStatus] {
    use crate::status::FeatureRequestStatus as S;
    match from {
        S::Draft => &[S::IntakeInProgress],
        S::IntakeInProgress => &[S::PendingAssessment],
        S::PendingAssessment => &[S::UnderReview],
        S::UnderReview => &[S::Approved, S::Rejected, S::Deferred, S::NeedsInfo],
        S::NeedsInfo | S::Deferred => &[S::UnderReview],
        S::Approved => &[S::InBacklog, S::InProgress],
        S::InBacklog => &[S::InProgress],
        S::InProgress => &[S::Completed],
        S::Rejected | S::Completed => &[],
    }
}

/// Whether `from -> to` is an edge of the workflow graph.
#[must_use]
pub fn is_transition_allowed(from: FeatureRequestStatus, to: FeatureRequestStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Decide whether a requested status change is legal.
///
/// Evaluate this against the status stored immediately before the mutation,
/// never a stale cached value.
///
/// # Errors
///
/// Returns [`TransitionRejected`] carrying the disallowed pair for every
/// `(from, to)` that is not an edge, including `current == target`.
pub fn attempt_transition(
    current: FeatureRequestStatus,
    target: FeatureRequestStatus,
) -> Result<(), TransitionRejected> {
    if is_transition_allowed(current, target) {
        Ok(())
    } else {
        Err(TransitionRejected {
            from: current,
            to: target,
        })
    }
}

/// Validate a transition and, on acceptance, emit it as a fact.
///
/// The returned [`TransitionEvent`] is produced exactly once per accepted
/// transition and carries the exact `(from, to)` pair that was validated.
///
/// # Errors
///
/// Returns [`TransitionRejected`] when the transition is not an edge of the
/// workflow graph.
pub fn transition_event(
    request_id: Uuid,
    organization_id: Uuid,
    actor_id: Uuid,
    current: FeatureRequestStatus,
    target: FeatureRequestStatus,
) -> Result<TransitionEvent, TransitionRejected> {
    attempt_transition(current, target)?;
    Ok(TransitionEvent {
        request_id,
        organization_id,
        from: current,
        to: target,
        actor_id,
        occurred_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::FeatureRequestStatus as S;

    /// The full edge list, kept independent of `allowed_targets` so the two
    /// can disagree loudly if the table is edited.
    const EDGES: [(S, S); 13] = [
        (S::Draft, S::IntakeInProgress),
        (S::IntakeInProgress, S::PendingAssessment),
        (S::PendingAssessment, S::UnderReview),
        (S::UnderReview, S::Approved),
        (S::UnderReview, S::Rejected),
        (S::UnderReview, S::Deferred),
        (S::UnderReview, S::NeedsInfo),
        (S::NeedsInfo, S::UnderReview),
        (S::Approved, S::InBacklog),
        (S::Approved, S::InProgress),
        (S::InBacklog, S::InProgress),
        (S::InProgress, S::Completed),
        (S::Deferred, S::UnderReview),
    ];

    #[test]
    fn every_edge_is_accepted() {
        for (from, to) in EDGES {
            assert!(
                attempt_transition(from, to).is_ok(),
                "{from} -> {to} should be legal"
            );
        }
    }

    #[test]
    fn every_non_edge_is_rejected_with_the_offending_pair() {
        for from in S::ALL {
            for to in S::ALL {
                if EDGES.contains(&(from, to)) {
                    continue;
                }
                let rejected = attempt_transition(from, to)
                    .expect_err("non-edges must be rejected");
                assert_eq!(rejected.from, from);
                assert_eq!(rejected.to, to);
            }
        }
    }

    #[test]
    fn same_status_is_rejected_not_a_noop() {
        for status in S::ALL {
            assert!(attempt_transition(status, status).is_err());
        }
    }

    #[test]
    fn terminal_statuses_have_no_outbound_edges() {
        assert!(allowed_targets(S::Rejected).is_empty());
        assert!(allowed_targets(S::Completed).is_empty());
    }

    #[test]
    fn accepted_event_echoes_the_validated_pair() {
        let request_id = Uuid::new_v4();
        let organization_id = Uuid::new_v4();
        let actor_id = Uuid::new_v4();

        let event = transition_event(
            request_id,
            organization_id,
            actor_id,
            S::UnderReview,
            S::Approved,
        )
        .expect("legal edge");

        assert_eq!(event.request_id, request_id);
        assert_eq!(event.organization_id, organization_id);
        assert_eq!(event.actor_id, actor_id);
        assert_eq!(event.from, S::UnderReview);
        assert_eq!(event.to, S::Approved);
    }

    #[test]
    fn rejected_transition_emits_no_event() {
        let result = transition_event(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            S::Completed,
            S::Draft,
        );
        assert!(result.is_err());
    }
}
