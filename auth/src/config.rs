//! Admission-control configuration.
//!
//! Configuration values are provided by the application, not hardcoded at
//! call sites.

use std::time::Duration;

/// Rate limiting configuration.
///
/// One config currently applies to every caller; per-plan tiers would pick
/// a config per organization at limiter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum operations per window.
    ///
    /// Default: 100
    pub capacity: u32,

    /// Window length.
    ///
    /// Default: 60 seconds
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a config with the default capacity and window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capacity: 100,
            window: Duration::from_secs(60),
        }
    }

    /// Set the per-window capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the window length.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_100_per_minute() {
        let config = RateLimitConfig::default();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.window, Duration::from_secs(60));
    }

    #[test]
    fn builders_override_the_defaults() {
        let config = RateLimitConfig::new()
            .with_capacity(10)
            .with_window(Duration::from_secs(1));
        assert_eq!(config.capacity, 10);
        assert_eq!(config.window, Duration::from_secs(1));
    }
}
