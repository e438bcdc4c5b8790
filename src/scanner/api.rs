//! Scanner API
//!
//! Public surface of the scanner system. Other modules import from here rather
//! than from the internal modules.

pub use crate::scanner::device::{CameraDevice, CameraStream, FrameFeed, FrameFeedCamera};
pub use crate::scanner::error::{DeviceError, InitError};
pub use crate::scanner::lifecycle::ScannerHandle;
pub use crate::scanner::types::{
    DecodeConfig, DecodeRegion, ScanEvent, ScanEventReceiver, ScannerState,
};
