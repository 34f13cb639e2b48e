//! Rate limit for partial message pushes.

use std::time::Duration;

use tokio::time::Instant;

/// Allows at most one partial push per interval.
///
/// The first request is always allowed. Final pushes do not go through the
/// throttler at all.
#[derive(Debug, Clone)]
pub struct UpdateThrottler {
    interval: Duration,
    last_push: Option<Instant>,
}

impl UpdateThrottler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_push: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_push(&self) -> Option<Instant> {
        self.last_push
    }

    /// Whether a push at `now` is allowed (strictly more than one interval
    /// since the last recorded push).
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_push {
            Some(last) => now.saturating_duration_since(last) > self.interval,
            None => true,
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.last_push = Some(now);
    }

    /// Check and record in one step.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.record(now);
            true
        } else {
            false
        }
    }
}
