//! Cooperative cancellation, checked at document and shard boundaries only —
//! no channel, no async runtime, just explicit state over coroutine
//! machinery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cheap, cloneable flag the caller can flip from another thread to ask an
/// in-flight search to stop early. Checked at the top of each document
/// iteration and before starting a new shard scan; never polled internally
/// by any blocking primitive.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Wall-clock deadline tracking for `max_wall_time`/`flush_wall_time`,
/// checked at the same suspension points as [`CancellationToken`] rather
/// than via a timer thread.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    pub fn far_future() -> Self {
        // `Instant` has no "infinite" sentinel; a century out is close enough
        // for a process that will never run that long.
        Self {
            at: Instant::now() + Duration::from_secs(60 * 60 * 24 * 365 * 100),
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_canceled() {
        let tok = CancellationToken::new();
        assert!(!tok.is_canceled());
    }

    #[test]
    fn cancel_is_visible_through_clone() {
        let tok = CancellationToken::new();
        let clone = tok.clone();
        clone.cancel();
        assert!(tok.is_canceled());
    }

    #[test]
    fn deadline_far_future_never_expires_in_a_test_run() {
        let deadline = Deadline::far_future();
        assert!(!deadline.expired());
    }

    #[test]
    fn deadline_after_zero_is_immediately_expired() {
        let deadline = Deadline::after(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(1));
        assert!(deadline.expired());
    }
}
