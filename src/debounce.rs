//! Debounce gate for decode events
//!
//! Cameras keep decoding the same code for as long as it stays in frame. The
//! gate lets the first event through and swallows everything else for a fixed
//! window, whatever the text.

use crate::core::time::{SystemTimeProvider, TimeProvider};
use std::time::Duration;
use tokio::time::Instant;

/// Default suppression window after an accepted event
pub const DEFAULT_DEBOUNCE_GATE: Duration = Duration::from_millis(1000);

/// Time-based gate on scan events
pub struct ScanDebouncer<T: TimeProvider = SystemTimeProvider> {
    gate: Duration,
    last_accepted: Option<Instant>,
    time_provider: T,
}

impl ScanDebouncer<SystemTimeProvider> {
    pub fn new(gate: Duration) -> Self {
        Self::with_time_provider(gate, SystemTimeProvider)
    }
}

impl Default for ScanDebouncer<SystemTimeProvider> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_GATE)
    }
}

impl<T: TimeProvider> ScanDebouncer<T> {
    pub fn with_time_provider(gate: Duration, time_provider: T) -> Self {
        Self {
            gate,
            last_accepted: None,
            time_provider,
        }
    }

    /// Returns true when `raw_text` should be processed
    pub fn accept(&mut self, raw_text: &str) -> bool {
        let now = self.time_provider.now();
        if let Some(last) = self.last_accepted {
            if now.duration_since(last) < self.gate {
                log::trace!("Debounced scan '{}'", raw_text);
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }

    /// Open the gate immediately
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}
