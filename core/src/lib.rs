//! # Trellis Core
//!
//! Domain model and workflow rules for the Trellis feature-request intake
//! platform.
//!
//! This crate is the functional core of the event distribution subsystem:
//! pure types and pure decisions, no I/O. The imperative pieces (webhook
//! delivery, rate limiting, the HTTP surface) live in the sibling crates
//! and consume these types.
//!
//! ## Contents
//!
//! - [`status`]: the [`FeatureRequestStatus`](status::FeatureRequestStatus)
//!   lifecycle enum
//! - [`workflow`]: the transition graph and
//!   [`attempt_transition`](workflow::attempt_transition)
//! - [`event`]: [`EventKind`](event::EventKind),
//!   [`TransitionEvent`](event::TransitionEvent), and the webhook envelope
//! - [`scope`]: the `admin ⊇ write ⊇ read` permission lattice
//! - [`request_store`]: the persistence contract the workflow core needs
//!   from the (external) SQL layer

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod event;
pub mod request_store;
pub mod scope;
pub mod status;
pub mod workflow;

// Re-export main types for convenience
pub use event::{EventKind, TransitionEvent, UnknownEventKind, WebhookEnvelope};
pub use request_store::{FeatureRequest, InMemoryRequestStore, RequestStore, RequestStoreError};
pub use scope::{has_scope, Scope};
pub use status::FeatureRequestStatus;
pub use workflow::{allowed_targets, attempt_transition, transition_event, TransitionRejected};
