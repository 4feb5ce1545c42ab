//! # Retry Policy
//!
//! Bounded exponential backoff for work that lost a race for SQLite's
//! write lock.
//!
//! ```text
//! attempt 1 ──BUSY──► sleep ~25ms ──► attempt 2 ──BUSY──► sleep ~50ms ──► ...
//!                                                                         │
//!                             attempt max_attempts ──BUSY──► give up ◄────┘
//! ```

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

/// How many times to attempt a transaction and how long to wait between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. At least 1.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_backoff: Duration,

    /// Ceiling for any single delay, jitter included.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(25),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Fresh backoff schedule for one call. Jittered, no overall deadline;
    /// `max_attempts` is the only bound. Draw delays through
    /// [`RetryPolicy::next_delay`] so jitter never exceeds `max_backoff`.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_backoff,
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Next delay from `backoff`, capped at `max_backoff`.
    pub fn next_delay(&self, backoff: &mut ExponentialBackoff) -> Duration {
        backoff
            .next_backoff()
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_millis(25));
        assert_eq!(policy.max_backoff, Duration::from_millis(500));
    }

    #[test]
    fn test_new_clamps() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100), Duration::from_millis(10));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.max_backoff, Duration::from_millis(100));
    }

    #[test]
    fn test_delays_stay_within_ceiling() {
        let policy = RetryPolicy::default();
        let mut backoff = policy.backoff();

        let first = policy.next_delay(&mut backoff);
        // default randomization factor is 0.5 around the initial interval
        assert!(first <= Duration::from_millis(38));

        for _ in 0..20 {
            assert!(policy.next_delay(&mut backoff) <= policy.max_backoff);
        }
    }

    #[test]
    fn test_next_delay_caps_jitter() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(100));
        let mut raw = policy.backoff();
        let mut capped = policy.backoff();

        for _ in 0..50 {
            assert!(raw.next_backoff().unwrap() <= Duration::from_millis(150));
            assert!(policy.next_delay(&mut capped) <= Duration::from_millis(100));
        }
    }
}
