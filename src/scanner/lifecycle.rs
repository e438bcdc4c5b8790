//! Scanner lifecycle
//!
//! A [`ScannerHandle`] owns the acquired camera for as long as it lives. The
//! decode loop runs on its own task once started and is steered through a
//! `watch` channel, so pausing never releases the camera and stopping (or
//! dropping the handle) always does, exactly once.

use crate::scanner::device::{CameraDevice, CameraStream};
use crate::scanner::error::{DeviceError, InitError};
use crate::scanner::types::{DecodeConfig, ScanEvent, ScanEventReceiver, ScannerState};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Paused,
    Stopped,
}

/// Explicitly owned scanner bound to one display surface
pub struct ScannerHandle {
    surface_id: String,
    config: DecodeConfig,
    state: ScannerState,
    control: watch::Sender<RunState>,
    idle_stream: Option<Box<dyn CameraStream>>,
    events: Option<UnboundedSender<ScanEvent>>,
    decode_task: Option<JoinHandle<()>>,
}

impl ScannerHandle {
    /// Acquire the camera for `surface_id`
    ///
    /// Returns the handle together with the single receiver of decode events.
    pub async fn initialize(
        device: &dyn CameraDevice,
        surface_id: &str,
        config: DecodeConfig,
    ) -> Result<(Self, ScanEventReceiver), InitError> {
        let stream = device.acquire(surface_id).await.map_err(|e| {
            log::warn!("Camera initialisation failed for '{}': {}", surface_id, e);
            e
        })?;
        let (events_tx, events_rx) = unbounded_channel();
        let (control, _) = watch::channel(RunState::Paused);

        log::debug!(
            "Scanner ready on '{}' ({} fps, region {})",
            surface_id,
            config.fps,
            config.region
        );

        Ok((
            Self {
                surface_id: surface_id.to_string(),
                config,
                state: ScannerState::Ready,
                control,
                idle_stream: Some(stream),
                events: Some(events_tx),
                decode_task: None,
            },
            events_rx,
        ))
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    /// Begin continuous decoding
    ///
    /// Returns true when the scanner is started (including when it already
    /// was), false when the handle has been stopped.
    pub fn start(&mut self) -> bool {
        match self.state {
            ScannerState::Running | ScannerState::Paused => true,
            ScannerState::Stopped => false,
            ScannerState::Ready => {
                let (Some(stream), Some(events)) = (self.idle_stream.take(), self.events.take())
                else {
                    return false;
                };
                self.control.send_replace(RunState::Running);
                let control = self.control.subscribe();
                self.decode_task = Some(tokio::spawn(decode_loop(
                    stream,
                    control,
                    events,
                    self.config.clone(),
                )));
                self.state = ScannerState::Running;
                log::debug!("Scanner started on '{}'", self.surface_id);
                true
            }
        }
    }

    /// Suspend decode attempts, keeping the camera
    pub fn pause(&mut self) {
        if self.state == ScannerState::Running {
            self.control.send_replace(RunState::Paused);
            self.state = ScannerState::Paused;
            log::trace!("Scanner paused");
        }
    }

    /// Continue decode attempts after `pause`
    pub fn resume(&mut self) {
        if self.state == ScannerState::Paused {
            self.control.send_replace(RunState::Running);
            self.state = ScannerState::Running;
            log::trace!("Scanner resumed");
        }
    }

    /// Stop decoding and release the camera
    ///
    /// Safe to call repeatedly and on a handle that never started.
    pub async fn stop(&mut self) {
        match self.state {
            ScannerState::Stopped => return,
            ScannerState::Ready => {
                if let Some(stream) = self.idle_stream.take() {
                    hand_back(stream).await;
                }
            }
            ScannerState::Running | ScannerState::Paused => {
                self.control.send_replace(RunState::Stopped);
                if let Some(task) = self.decode_task.take() {
                    if let Err(e) = task.await {
                        log::debug!("Decode loop ended abnormally (ignored): {}", e);
                    }
                }
            }
        }
        self.events = None;
        self.state = ScannerState::Stopped;
        log::debug!("Scanner stopped on '{}'", self.surface_id);
    }
}

impl Drop for ScannerHandle {
    fn drop(&mut self) {
        if self.state == ScannerState::Stopped {
            return;
        }
        // A running loop sees Stopped (or the closed channel) and releases on its own
        self.control.send_replace(RunState::Stopped);

        if let Some(stream) = self.idle_stream.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(hand_back(stream));
                }
                Err(_) => log::warn!(
                    "Scanner on '{}' dropped outside a runtime; camera not released",
                    self.surface_id
                ),
            }
        }
    }
}

async fn decode_loop(
    mut stream: Box<dyn CameraStream>,
    mut control: watch::Receiver<RunState>,
    events: UnboundedSender<ScanEvent>,
    config: DecodeConfig,
) {
    let mut ticker = tokio::time::interval(config.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut was_paused = false;

    loop {
        let state = *control.borrow_and_update();
        match state {
            RunState::Stopped => break,
            RunState::Paused => {
                was_paused = true;
                if control.changed().await.is_err() {
                    break;
                }
                continue;
            }
            RunState::Running => {}
        }

        if was_paused {
            stream.flush().await;
            was_paused = false;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            changed = control.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }

        // A pause may have landed while waiting for the tick
        if *control.borrow() != RunState::Running {
            continue;
        }

        match stream.decode_frame(config.region).await {
            Ok(Some(text)) => {
                log::trace!("Decoded frame: {}", text);
                if events.send(ScanEvent::new(text)).is_err() {
                    log::debug!("Scan event receiver dropped; ending decode loop");
                    break;
                }
            }
            Ok(None) => {}
            Err(DeviceError::Closed) => {
                log::warn!("Camera stream closed; decoding stopped");
                break;
            }
            Err(e) => log::debug!("Decode attempt failed: {}", e),
        }
    }

    hand_back(stream).await;
}

// Frames still queued belong to this handle and must not reach the next one
async fn hand_back(mut stream: Box<dyn CameraStream>) {
    stream.flush().await;
    stream.release().await;
}
