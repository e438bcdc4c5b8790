//! Time provider abstraction for testable time-dependent logic
//!
//! Monotonic time is `tokio::time::Instant` so that tests running on a paused
//! tokio clock see the same time as the timers driving the session.

use chrono::{DateTime, Local};
#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::time::Duration;
use tokio::time::Instant;

/// Abstraction over system time for testable time-dependent logic
pub trait TimeProvider: Send + Sync {
    /// Get the current monotonic time (for measuring intervals)
    fn now(&self) -> Instant;

    /// Get the current wall-clock time (for display timestamps)
    fn local_time(&self) -> DateTime<Local>;
}

/// Production time provider
#[derive(Debug, Default, Clone)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Mock time provider for deterministic testing
#[derive(Clone)]
#[cfg(test)]
pub struct MockTimeProvider {
    current_instant: Arc<Mutex<Instant>>,
    current_local: Arc<Mutex<DateTime<Local>>>,
}

#[cfg(test)]
impl MockTimeProvider {
    pub fn new() -> Self {
        Self {
            current_instant: Arc::new(Mutex::new(Instant::now())),
            current_local: Arc::new(Mutex::new(Local::now())),
        }
    }

    /// Advance both monotonic and wall-clock time by the given duration
    pub fn advance_time(&self, duration: Duration) {
        {
            let mut instant = self.current_instant.lock().unwrap();
            *instant += duration;
        }
        {
            let mut local = self.current_local.lock().unwrap();
            *local += chrono::Duration::from_std(duration).unwrap();
        }
    }
}

#[cfg(test)]
impl TimeProvider for MockTimeProvider {
    fn now(&self) -> Instant {
        *self.current_instant.lock().unwrap()
    }

    fn local_time(&self) -> DateTime<Local> {
        *self.current_local.lock().unwrap()
    }
}
