//! # Request Throttler
//!
//! Sliding-window rate limiter shared by every outbound call. A `Throttler`
//! built with `limit = R` and `window = W` lets at most `R` callers through
//! `throttle()` in any interval of length `W`.
//!
//! ## How it works:
//! The throttler keeps the release instants it has handed out, oldest first.
//! A new caller is assigned the earliest instant that keeps the window
//! invariant: `now` when fewer than `R` releases fall inside the window,
//! otherwise exactly `W` after the `R`-th most recent release. The
//! reservation is recorded under the lock and the caller then sleeps until
//! its instant with the lock released, so concurrent callers are paced
//! correctly without ever holding the lock across an `.await`.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// A shared sliding-window rate limiter.
#[derive(Debug)]
pub struct Throttler {
    /// Maximum releases per window. Always at least 1.
    limit: usize,
    /// Length of the sliding window.
    window: Duration,
    /// Release instants handed out, in ascending order.
    releases: Mutex<VecDeque<Instant>>,
}

impl Throttler {
    /// Creates a throttler allowing `limit` calls per `window`.
    ///
    /// A `limit` of zero is treated as one.
    pub fn new(limit: usize, window: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            window,
            releases: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    /// Calls allowed per window.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Suspends the caller until it may proceed without exceeding the limit.
    pub async fn throttle(&self) {
        let release_at = self.reserve(Instant::now());
        sleep_until(release_at).await;
    }

    /// Books the next free release instant at or after `now`.
    fn reserve(&self, now: Instant) -> Instant {
        let mut releases = self.releases.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Entries that left the window can no longer constrain anyone.
        while releases
            .front()
            .is_some_and(|&front| front + self.window <= now)
        {
            releases.pop_front();
        }

        let release_at = if releases.len() < self.limit {
            now
        } else {
            let anchor = releases[releases.len() - self.limit];
            (anchor + self.window).max(now)
        };

        releases.push_back(release_at);
        release_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_burst_up_to_the_limit_is_immediate() {
        let throttler = Throttler::new(3, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..3 {
            throttler.throttle().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_callers_are_paced_by_the_window() {
        let throttler = Throttler::new(2, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..5 {
            throttler.throttle().await;
        }

        // releases at 0, 0, 1, 1, 2
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_never_exceed_the_limit() {
        let throttler = Arc::new(Throttler::new(2, Duration::from_millis(500)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..6 {
            let throttler = Arc::clone(&throttler);
            handles.push(tokio::spawn(async move {
                throttler.throttle().await;
                Instant::now()
            }));
        }

        let mut released = Vec::new();
        for handle in handles {
            released.push(handle.await.unwrap() - start);
        }
        released.sort();

        // any window of 500ms contains at most two releases
        for (i, at) in released.iter().enumerate().skip(2) {
            assert!(*at - released[i - 2] >= Duration::from_millis(500));
        }
        assert_eq!(released.last().copied(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn zero_limit_is_clamped() {
        assert_eq!(Throttler::new(0, Duration::from_secs(1)).limit(), 1);
    }
}
