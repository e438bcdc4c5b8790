//! Scanner Types
//!
//! Shared types used throughout the scanner module.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use strum_macros::Display;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Default decode attempts per second
pub const DEFAULT_SCAN_FPS: u32 = 10;

/// Default edge length of the square decode region, in pixels
pub const DEFAULT_REGION_EDGE: u32 = 250;

/// One successful decode from a camera frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub raw_text: String,
    pub timestamp: Instant,
}

impl ScanEvent {
    /// Stamp decoded text with the current time
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            timestamp: Instant::now(),
        }
    }
}

/// Receiving end of the decode event channel; the session is its only consumer
pub type ScanEventReceiver = UnboundedReceiver<ScanEvent>;

/// Area of the frame handed to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRegion {
    pub width: u32,
    pub height: u32,
}

impl Default for DecodeRegion {
    fn default() -> Self {
        Self {
            width: DEFAULT_REGION_EDGE,
            height: DEFAULT_REGION_EDGE,
        }
    }
}

impl fmt::Display for DecodeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for DecodeRegion {
    type Err = String;

    /// Parse `"250x250"` (or a single edge like `"300"` for a square region)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_edge = |edge: &str| -> Result<u32, String> {
            match edge.trim().parse::<u32>() {
                Ok(0) | Err(_) => Err(format!(
                    "Invalid decode region '{}': expected WIDTHxHEIGHT with positive integers",
                    s
                )),
                Ok(n) => Ok(n),
            }
        };

        match s.split_once(&['x', 'X'][..]) {
            Some((w, h)) => Ok(Self {
                width: parse_edge(w)?,
                height: parse_edge(h)?,
            }),
            None => {
                let edge = parse_edge(s)?;
                Ok(Self {
                    width: edge,
                    height: edge,
                })
            }
        }
    }
}

const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// Decode loop settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Decode attempts per second
    pub fps: u32,
    pub region: DecodeRegion,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_SCAN_FPS,
            region: DecodeRegion::default(),
        }
    }
}

impl DecodeConfig {
    /// Delay between decode attempts, never shorter than one millisecond
    pub fn frame_interval(&self) -> Duration {
        (Duration::from_secs(1) / self.fps.max(1)).max(MIN_FRAME_INTERVAL)
    }
}

/// Externally visible lifecycle position of a scanner handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScannerState {
    /// Camera acquired, decode loop not started
    Ready,
    Running,
    Paused,
    /// Camera released; terminal
    Stopped,
}
