//! Camera device seam
//!
//! A [`CameraDevice`] hands out at most one [`CameraStream`] at a time. The
//! stream performs individual decode attempts; the lifecycle in
//! `scanner::lifecycle` decides when they happen.

use crate::scanner::error::{DeviceError, InitError};
use crate::scanner::types::DecodeRegion;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// A camera that can be bound to a display surface
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Acquire exclusive access for `surface_id`
    async fn acquire(&self, surface_id: &str) -> Result<Box<dyn CameraStream>, InitError>;
}

/// An acquired camera producing frames
#[async_trait]
pub trait CameraStream: Send {
    /// Attempt one decode inside `region`
    ///
    /// `Ok(None)` means the frame held no readable code.
    async fn decode_frame(&mut self, region: DecodeRegion) -> Result<Option<String>, DeviceError>;

    /// Drop frames captured while decoding was paused
    async fn flush(&mut self) {}

    /// Give the camera back to its device
    async fn release(&mut self);
}

/// Camera fed with already-decoded text through a channel
///
/// Models a keyboard-wedge QR scanner: the terminal front end pushes each
/// scanned line into the [`FrameFeed`], and every decode attempt consumes at
/// most one of them.
#[derive(Clone)]
pub struct FrameFeedCamera {
    slot: Arc<Mutex<Option<UnboundedReceiver<String>>>>,
    releases: Arc<AtomicUsize>,
}

/// Producer side of a [`FrameFeedCamera`]
#[derive(Clone)]
pub struct FrameFeed {
    tx: UnboundedSender<String>,
}

impl FrameFeed {
    /// Present one decoded frame to the camera. Returns false once the camera is gone.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.tx.send(text.into()).is_ok()
    }
}

impl FrameFeedCamera {
    pub fn new() -> (Self, FrameFeed) {
        let (tx, rx) = unbounded_channel();
        let camera = Self {
            slot: Arc::new(Mutex::new(Some(rx))),
            releases: Arc::new(AtomicUsize::new(0)),
        };
        (camera, FrameFeed { tx })
    }

    /// How many times an acquired stream has been handed back
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Whether the camera is free to be acquired
    pub fn is_available(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl CameraDevice for FrameFeedCamera {
    async fn acquire(&self, surface_id: &str) -> Result<Box<dyn CameraStream>, InitError> {
        let frames = self
            .slot
            .lock()
            .map_err(|_| InitError::Aborted {
                reason: "camera state poisoned".to_string(),
            })?
            .take()
            .ok_or_else(|| InitError::Aborted {
                reason: "camera is in use".to_string(),
            })?;
        log::debug!("Camera acquired for surface '{}'", surface_id);

        Ok(Box::new(FrameFeedStream {
            frames: Some(frames),
            slot: self.slot.clone(),
            releases: self.releases.clone(),
        }))
    }
}

struct FrameFeedStream {
    frames: Option<UnboundedReceiver<String>>,
    slot: Arc<Mutex<Option<UnboundedReceiver<String>>>>,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl CameraStream for FrameFeedStream {
    async fn decode_frame(&mut self, _region: DecodeRegion) -> Result<Option<String>, DeviceError> {
        let frames = self.frames.as_mut().ok_or(DeviceError::Closed)?;
        match frames.try_recv() {
            Ok(text) => Ok(Some(text)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(DeviceError::Closed),
        }
    }

    async fn flush(&mut self) {
        if let Some(frames) = self.frames.as_mut() {
            let mut dropped = 0usize;
            while frames.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                log::trace!("Discarded {} frame(s) captured while paused", dropped);
            }
        }
    }

    async fn release(&mut self) {
        let Some(frames) = self.frames.take() else {
            return;
        };
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(frames),
            Err(_) => log::warn!("Camera state poisoned; camera not returned to device"),
        }
        self.releases.fetch_add(1, Ordering::SeqCst);
        log::debug!("Camera released");
    }
}
