//! Reconnection policy.

use std::time::Duration;

use mr_core::config::EventsConfig;
use mr_core::constants::DEFAULT_RECONNECT_DELAY_MS;

/// When to retry after the connection closes.
///
/// The delay is fixed: every close schedules exactly one attempt after
/// `delay`, with no growth between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Wait between a close and the next attempt.
    pub delay: Duration,
    /// Maximum consecutive attempts without a successful open (`None` = unlimited).
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Unlimited retries with the given delay.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Build a policy from the `[events]` config section.
    pub fn from_config(config: &EventsConfig) -> Self {
        let policy = Self::fixed(config.reconnect_delay());
        match config.max_attempts() {
            Some(max) => policy.with_max_attempts(max),
            None => policy,
        }
    }

    /// Cap the number of consecutive attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay before reconnection attempt number `attempt` (1-based, reset
    /// after every successful open), or `None` once the cap is exceeded.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt > max => None,
            _ => Some(self.delay),
        }
    }
}
