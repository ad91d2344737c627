//! Retry schedule for the streaming transport.
//!
//! The schedule is a strategy object: an explicit list of delays, one
//! per retry, so the state machine's transitions can be tested with a
//! zero-delay schedule and no real timers.

use std::time::Duration;

/// Fixed schedule of retry delays.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl Default for RetrySchedule {
    /// The production schedule: three retries at 1s, 2s, 4s.
    fn default() -> Self {
        Self {
            delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }
}

impl RetrySchedule {
    /// Builds a schedule from explicit delays.
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// A schedule of `n` zero-delay retries (test support).
    pub fn immediate(n: usize) -> Self {
        Self {
            delays: vec![Duration::ZERO; n],
        }
    }

    /// Maximum number of retries (attempts are `1 + max_retries`).
    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }

    /// The delay before retry `retry` (0-based), or `None` when the
    /// budget is exhausted.
    pub fn delay_for(&self, retry: usize) -> Option<Duration> {
        self.delays.get(retry).copied()
    }
}
