//! Rate limiter for outgoing Matrix messages.
//!
//! Keeps replies spaced out so the homeserver does not answer with
//! `M_LIMIT_EXCEEDED`, and backs off when it does anyway.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Rate limiter that enforces minimum intervals between operations.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum duration between allowed operations.
    min_interval: Duration,

    /// Earliest instant the next operation may start.
    next_allowed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_allowed: Mutex::new(None),
        }
    }

    /// Creates a rate limiter from milliseconds.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Waits until an operation is allowed, then reserves the next slot.
    ///
    /// Returns the duration waited (0 if no wait was needed).
    pub async fn wait_and_acquire(&self) -> Duration {
        let mut next = self.next_allowed.lock().await;

        let wait_duration = next.map_or(Duration::ZERO, |at| {
            at.saturating_duration_since(Instant::now())
        });

        if !wait_duration.is_zero() {
            debug!(
                "Rate limiter: waiting {:?} before next message",
                wait_duration
            );
            tokio::time::sleep(wait_duration).await;
        }

        *next = Some(Instant::now() + self.min_interval);
        wait_duration
    }

    /// Checks if an operation is currently allowed without blocking.
    pub async fn is_allowed(&self) -> bool {
        self.time_until_allowed().await.is_zero()
    }

    /// Returns the time remaining until the next operation is allowed.
    pub async fn time_until_allowed(&self) -> Duration {
        let next = self.next_allowed.lock().await;
        next.map_or(Duration::ZERO, |at| {
            at.saturating_duration_since(Instant::now())
        })
    }

    /// Pushes the next slot out by the server's `retry_after_ms` hint.
    pub async fn handle_rate_limited(&self, retry_after_ms: u64) {
        warn!(
            "Homeserver rate limited us: retry after {} ms",
            retry_after_ms
        );
        let mut next = self.next_allowed.lock().await;
        let until = Instant::now() + Duration::from_millis(retry_after_ms);
        if next.is_none_or(|at| at < until) {
            *next = Some(until);
        }
    }
}
