//! Scanner Component
//!
//! Wraps a camera-style decoder device behind an explicitly owned
//! [`ScannerHandle`]. The handle acquires the camera on `initialize`, runs a
//! fixed-rate decode loop once started, and releases the camera exactly once
//! on `stop` or drop.
//!
//! ## Core Features
//!
//! - **ScannerHandle**: start / pause / resume / stop lifecycle, idempotent where it matters
//! - **Single consumer**: every successful decode becomes one [`ScanEvent`] on an unbounded channel
//! - **Device seam**: [`CameraDevice`] / [`CameraStream`] traits, with a channel-fed
//!   [`FrameFeedCamera`] for keyboard-wedge scanners and tests

pub mod api;
pub(crate) mod device;
pub(crate) mod error;
pub(crate) mod lifecycle;
pub(crate) mod types;

pub use api::*;
