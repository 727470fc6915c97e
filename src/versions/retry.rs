//! Retry with exponential backoff.

use std::time::Duration;

use tracing::warn;

use crate::config::NetworkSettings;
use crate::error::Result;

/// Bounded retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first; at least one is always made.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after each further failure.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// One attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_settings(network: &NetworkSettings) -> Self {
        Self::new(network.max_attempts, network.backoff_initial())
    }

    /// Delay after failed attempt number `attempt` (0-based): 1x, 2x, 4x...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it succeeds or attempts are exhausted, sleeping with
    /// `sleep` between attempts. Returns the last error.
    pub fn run<T>(
        &self,
        what: &str,
        sleep: &dyn Fn(Duration),
        mut op: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 >= self.max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt + 1,
                        self.max_attempts,
                        e,
                        delay
                    );
                    sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
