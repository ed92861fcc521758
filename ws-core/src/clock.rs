//! Injectable time source
//!
//! Everything that computes activity timestamps reads time through [`Clock`]
//! so reconciliation can be driven deterministically in tests.

use chrono::Utc;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct ManualClock {
    millis: std::sync::atomic::AtomicI64,
}

#[cfg(any(test, feature = "test-utils"))]
impl ManualClock {
    pub fn new() -> Self {
        Self::at(Utc::now().timestamp_millis())
    }

    pub fn at(millis: i64) -> Self {
        Self {
            millis: std::sync::atomic::AtomicI64::new(millis),
        }
    }

    pub fn forward(&self, duration: std::time::Duration) {
        self.millis.fetch_add(
            duration.as_millis() as i64,
            std::sync::atomic::Ordering::SeqCst,
        );
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(std::sync::atomic::Ordering::SeqCst)
    }
}
