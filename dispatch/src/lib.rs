//! # Trellis Dispatch
//!
//! Event fan-out for the Trellis intake platform: signed webhook delivery,
//! in-app notifications, and email, triggered by accepted workflow
//! transitions and other domain events.
//!
//! The entry point is [`EventDispatcher::dispatch`]: fire-and-forget from
//! the caller's point of view. Inside, the three fan-out legs (webhooks,
//! notifications, email) run concurrently and independently: one leg's
//! failure is logged and swallowed, never propagated, never allowed to
//! cancel a sibling. Per-subscription deliveries likewise settle
//! independently ("settle all, fail none of the others").
//!
//! ## Failure accounting
//!
//! A subscription's `failure_count` rises by one per failed delivery and
//! resets to zero on success. When it reaches the configured threshold the
//! subscription is deactivated and receives nothing further until it is
//! explicitly reactivated.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mocks;
pub mod notification;
pub mod providers;
pub mod signature;
pub mod subscription;

// Re-export main types for convenience
pub use config::DispatcherConfig;
pub use dispatcher::EventDispatcher;
pub use error::{DispatchError, Result};
pub use notification::{Notification, Recipient};
pub use signature::{sign, verify, SIGNATURE_HEADER};
pub use subscription::{
    generate_secret, NewSubscription, SubscriptionError, SubscriptionView, WebhookSubscription,
};
