//! Dispatcher configuration.

use std::time::Duration;

/// Configuration for the event dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Timeout for one webhook delivery attempt.
    ///
    /// Exceeding it aborts that one attempt and counts as a failure.
    /// Default: 5 seconds
    pub delivery_timeout: Duration,

    /// Consecutive failures after which a subscription is deactivated.
    ///
    /// Default: 10
    pub failure_threshold: u32,

    /// `User-Agent` header sent with webhook POSTs.
    pub user_agent: String,
}

impl DispatcherConfig {
    /// Create a config with the default timeout and threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(5),
            failure_threshold: 10,
            user_agent: format!("trellis-webhooks/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the per-attempt delivery timeout.
    #[must_use]
    pub const fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Set the deactivation threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the outbound `User-Agent`.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_production_values() {
        let config = DispatcherConfig::default();
        assert_eq!(config.delivery_timeout, Duration::from_secs(5));
        assert_eq!(config.failure_threshold, 10);
        assert!(config.user_agent.starts_with("trellis-webhooks/"));
    }
}
