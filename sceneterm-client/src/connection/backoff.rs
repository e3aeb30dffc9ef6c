//! Reconnect pacing

use std::time::{Duration, Instant};

const INITIAL_DELAY: Duration = Duration::from_millis(100);
const MAX_DELAY: Duration = Duration::from_secs(2);

/// Exponential delay between failed dial attempts
///
/// Doubles from 100ms up to 2s after each failure and resets on success.
#[derive(Debug, Clone)]
pub struct Backoff {
    delay: Duration,
    retry_at: Option<Instant>,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            delay: INITIAL_DELAY,
            retry_at: None,
        }
    }

    /// Whether a dial may be attempted at `now`
    pub fn ready(&self, now: Instant) -> bool {
        self.retry_at.map_or(true, |at| now >= at)
    }

    /// Time left until the next dial is allowed
    pub fn remaining(&self, now: Instant) -> Duration {
        self.retry_at
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Record a failed dial; returns the delay before the next one
    pub fn fail(&mut self, now: Instant) -> Duration {
        let delay = self.delay;
        self.retry_at = Some(now + delay);
        self.delay = (self.delay * 2).min(MAX_DELAY);
        delay
    }

    pub fn succeed(&mut self) {
        self.delay = INITIAL_DELAY;
        self.retry_at = None;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
