//! Clock provider.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Injected wherever time drives a decision (key expiry, bucket refill) so
/// tests can run against a manual clock instead of sleeping.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock provider backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
