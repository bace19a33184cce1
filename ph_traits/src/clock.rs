use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock abstraction for the control loop.
///
/// - now(): returns a monotonic Instant
/// - sleep(): blocks for the provided duration (implementations may simulate)
/// - ms_since(): milliseconds elapsed since an epoch Instant
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        dur.as_millis() as u64
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic clock whose time only moves when advanced or slept on.
    ///
    /// now() = origin + offset
    /// sleep(d) advances internal time by d without blocking and records d.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Set the absolute offset relative to origin.
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = d;
            }
        }

        /// Every duration passed to `sleep`, in call order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().map(|g| g.clone()).unwrap_or_default()
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut s) = self.sleeps.lock() {
                s.push(d);
            }
            self.advance(d);
        }
    }

}
