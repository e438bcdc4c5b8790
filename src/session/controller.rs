//! Check-in session controller
//!
//! One [`CheckInSession`] covers one opening of the check-in screen. It owns
//! the scanner handle, the debouncer and the view, and runs as a single task
//! selecting over operator commands, scan events, finished API calls and the
//! auto-return deadline.
//!
//! ```text
//!   Scanning ──scan──▶ Resolving ──▶ ShowingKnownUser ───────(display delay)──▶ Scanning
//!                          │    └──▶ ShowingDayPassPrompt ──confirm──▶ Resolving
//!                          │    └──▶ ShowingUnrecognizedPrompt ─confirm─▶ Resolving
//!                          └──error──▶ ShowingError ─────────(error delay)───▶ Scanning
//!   any phase ──Close──▶ Idle (terminal)
//! ```
//!
//! Every API call is tagged with the generation current when it was issued.
//! Cancelling, auto-returning or closing moves to a new generation, so late
//! answers to abandoned calls are dropped.

use crate::api::{CheckInOutcome, CheckInResolver, ResolveError, ResolveResult, UserMatch};
use crate::core::error_handling::operator_message;
use crate::core::time::{SystemTimeProvider, TimeProvider};
use crate::core::validation::{validate_scan_text, validate_visitor_name};
use crate::debounce::{ScanDebouncer, DEFAULT_DEBOUNCE_GATE};
use crate::scanner::{CameraDevice, DecodeConfig, ScanEvent, ScanEventReceiver, ScannerHandle};
use crate::session::command::SessionCommand;
use crate::session::state::{Phase, SessionView, STATUS_RESOLVING, STATUS_SCANNING};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

pub const DEFAULT_SURFACE_ID: &str = "scanner-view";
pub const DEFAULT_DISPLAY_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_ERROR_DELAY: Duration = Duration::from_millis(3000);

const CAMERA_FALLBACK: &str = "Camera unavailable";
const CAMERA_DISCONNECTED: &str = "Camera disconnected. Retry to reconnect.";

/// Timing and camera settings for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub surface_id: String,
    pub decode: DecodeConfig,
    pub debounce_gate: Duration,
    /// How long a successful outcome stays on screen
    pub display_delay: Duration,
    /// How long an error stays on screen
    pub error_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            surface_id: DEFAULT_SURFACE_ID.to_string(),
            decode: DecodeConfig::default(),
            debounce_gate: DEFAULT_DEBOUNCE_GATE,
            display_delay: DEFAULT_DISPLAY_DELAY,
            error_delay: DEFAULT_ERROR_DELAY,
        }
    }
}

/// Handle to a running check-in session
pub struct CheckInSession {
    commands: UnboundedSender<SessionCommand>,
    view: watch::Receiver<SessionView>,
    task: Option<JoinHandle<()>>,
}

impl CheckInSession {
    /// Open the check-in screen: acquire the camera and start scanning
    pub fn open(
        device: Arc<dyn CameraDevice>,
        resolver: Arc<CheckInResolver>,
        settings: SessionSettings,
    ) -> Self {
        Self::open_with_clock(device, resolver, settings, SystemTimeProvider)
    }

    pub fn open_with_clock<T>(
        device: Arc<dyn CameraDevice>,
        resolver: Arc<CheckInResolver>,
        settings: SessionSettings,
        clock: T,
    ) -> Self
    where
        T: TimeProvider + Clone + 'static,
    {
        let (commands_tx, commands_rx) = unbounded_channel();
        let (completions_tx, completions_rx) = unbounded_channel();
        let (view_tx, view_rx) = watch::channel(SessionView::default());

        let runner = SessionRunner {
            device,
            resolver,
            debouncer: ScanDebouncer::with_time_provider(settings.debounce_gate, clock.clone()),
            settings,
            clock,
            scanner: None,
            scan_events: None,
            view: SessionView::default(),
            view_tx,
            completions_tx,
            generation: 0,
            search_seq: 0,
            deadline: None,
            camera_message: None,
        };
        let task = tokio::spawn(runner.run(commands_rx, completions_rx));

        Self {
            commands: commands_tx,
            view: view_rx,
            task: Some(task),
        }
    }

    /// Queue an operator command. Returns false once the session has ended.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Snapshot of the current view
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Close the screen and wait until the camera has been released
    pub async fn close(mut self) -> SessionView {
        let _ = self.commands.send(SessionCommand::Close);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Check-in session ended abnormally: {}", e);
            }
        }
        self.view()
    }
}

enum Completion {
    Resolved {
        raw_text: String,
        result: ResolveResult<CheckInOutcome>,
    },
    CheckedIn(ResolveResult<CheckInOutcome>),
    DayPassRecorded {
        visitor_name: String,
        result: ResolveResult<()>,
    },
    Searched {
        seq: u64,
        result: ResolveResult<Vec<UserMatch>>,
    },
}

struct Tagged {
    generation: u64,
    completion: Completion,
}

enum Flow {
    Continue,
    Close,
}

struct SessionRunner<T: TimeProvider> {
    device: Arc<dyn CameraDevice>,
    resolver: Arc<CheckInResolver>,
    settings: SessionSettings,
    clock: T,
    debouncer: ScanDebouncer<T>,
    scanner: Option<ScannerHandle>,
    scan_events: Option<ScanEventReceiver>,
    view: SessionView,
    view_tx: watch::Sender<SessionView>,
    completions_tx: UnboundedSender<Tagged>,
    generation: u64,
    search_seq: u64,
    deadline: Option<Instant>,
    // Shown again whenever the session would otherwise return to scanning
    camera_message: Option<String>,
}

impl<T: TimeProvider + 'static> SessionRunner<T> {
    async fn run(
        mut self,
        mut commands: UnboundedReceiver<SessionCommand>,
        mut completions: UnboundedReceiver<Tagged>,
    ) {
        self.open_camera().await;

        loop {
            let deadline = self.deadline;
            let flow = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => Flow::Close,
                },
                event = next_scan(&mut self.scan_events) => {
                    match event {
                        Some(event) => self.handle_scan(event),
                        None => self.on_scanner_ended(),
                    }
                    Flow::Continue
                }
                Some(tagged) = completions.recv() => {
                    self.handle_completion(tagged);
                    Flow::Continue
                }
                _ = wait_until(deadline) => {
                    self.on_deadline();
                    Flow::Continue
                }
            };

            if let Flow::Close = flow {
                break;
            }
        }

        self.close().await;
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view.clone());
    }

    fn set_phase(&mut self, phase: Phase, status: impl Into<String>) {
        self.view.phase = phase;
        self.view.status = status.into();
        self.publish();
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.view.status = status.into();
        self.publish();
    }

    async fn open_camera(&mut self) {
        let opened = ScannerHandle::initialize(
            self.device.as_ref(),
            &self.settings.surface_id,
            self.settings.decode.clone(),
        )
        .await;

        match opened {
            Ok((mut scanner, events)) => {
                scanner.start();
                self.scanner = Some(scanner);
                self.scan_events = Some(events);
                self.camera_message = None;
                log::info!("Check-in open on '{}'", self.settings.surface_id);
                self.set_phase(Phase::Scanning, STATUS_SCANNING);
            }
            Err(e) => {
                let message = operator_message(&e, CAMERA_FALLBACK);
                self.camera_message = Some(message.clone());
                self.set_phase(
                    Phase::CameraUnavailable {
                        message: message.clone(),
                    },
                    message,
                );
            }
        }
    }

    fn pause_scanner(&mut self) {
        if let Some(scanner) = self.scanner.as_mut() {
            scanner.pause();
        }
    }

    fn on_scanner_ended(&mut self) {
        log::warn!("Scanner stopped delivering frames");
        self.scan_events = None;
        self.scanner = None;
        self.camera_message = Some(CAMERA_DISCONNECTED.to_string());
        if self.view.phase == Phase::Scanning {
            self.set_phase(
                Phase::CameraUnavailable {
                    message: CAMERA_DISCONNECTED.to_string(),
                },
                CAMERA_DISCONNECTED,
            );
        }
    }

    fn handle_scan(&mut self, event: ScanEvent) {
        if self.view.phase != Phase::Scanning {
            log::trace!("Scan ignored outside scanning");
            return;
        }
        let text = match validate_scan_text(&event.raw_text) {
            Ok(text) => text.to_string(),
            Err(e) => {
                log::debug!("Scan ignored: {}", e);
                return;
            }
        };
        if !self.debouncer.accept(&text) {
            return;
        }

        let generation = self.begin_resolving();
        self.spawn_request(generation, move |resolver| async move {
            let result = resolver.resolve(&text).await;
            Completion::Resolved {
                raw_text: text,
                result,
            }
        });
    }

    async fn handle_command(&mut self, command: SessionCommand) -> Flow {
        log::debug!("{:?} while {:?}", command, self.view.phase);
        match command {
            SessionCommand::Close => return Flow::Close,
            SessionCommand::ConfirmDayPass { name } => self.confirm_day_pass(name),
            SessionCommand::Cancel => {
                if self.view.phase.is_prompt() || self.view.phase.is_timed() {
                    self.return_to_scanning();
                }
            }
            SessionCommand::Search(text) => self.search(text),
            SessionCommand::SelectMatch(index) => self.select_match(index),
            SessionCommand::RetryCamera => {
                if matches!(self.view.phase, Phase::CameraUnavailable { .. }) {
                    self.open_camera().await;
                }
            }
        }
        Flow::Continue
    }

    fn confirm_day_pass(&mut self, name: Option<String>) {
        let entered = name.filter(|n| !n.trim().is_empty());
        let candidate = match &self.view.phase {
            Phase::ShowingDayPassPrompt { suggested_name } => {
                entered.unwrap_or_else(|| suggested_name.clone())
            }
            Phase::ShowingUnrecognizedPrompt { .. } => entered.unwrap_or_default(),
            _ => {
                log::debug!("No day pass waiting for confirmation");
                return;
            }
        };

        let visitor_name = match validate_visitor_name(&candidate) {
            Ok(name) => name,
            Err(e) => {
                self.set_status(e.message());
                return;
            }
        };

        let generation = self.begin_resolving();
        self.spawn_request(generation, move |resolver| async move {
            let result = resolver.create_day_pass_entry(&visitor_name).await;
            Completion::DayPassRecorded {
                visitor_name,
                result,
            }
        });
    }

    fn search(&mut self, text: String) {
        self.search_seq += 1;
        let seq = self.search_seq;
        self.view.search_query = text.clone();
        self.publish();

        self.spawn_request(self.generation, move |resolver| async move {
            let result = resolver
                .search_by_name(&text)
                .await
                .map(|matches| matches.collect());
            Completion::Searched { seq, result }
        });
    }

    fn select_match(&mut self, index: usize) {
        if matches!(self.view.phase, Phase::Resolving | Phase::Idle) {
            return;
        }
        let Some(user) = self.view.search_results.get(index).cloned() else {
            self.set_status(format!("No search result #{}", index + 1));
            return;
        };

        let generation = self.begin_resolving();
        self.spawn_request(generation, move |resolver| async move {
            Completion::CheckedIn(resolver.check_in_user(&user).await)
        });
    }

    fn begin_resolving(&mut self) -> u64 {
        self.generation += 1;
        self.deadline = None;
        self.pause_scanner();
        self.set_phase(Phase::Resolving, STATUS_RESOLVING);
        self.generation
    }

    fn spawn_request<F, Fut>(&self, generation: u64, request: F)
    where
        F: FnOnce(Arc<CheckInResolver>) -> Fut,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        let pending = request(self.resolver.clone());
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let completion = pending.await;
            if completions
                .send(Tagged {
                    generation,
                    completion,
                })
                .is_err()
            {
                log::trace!("Session ended before the request finished");
            }
        });
    }

    fn handle_completion(&mut self, tagged: Tagged) {
        let Tagged {
            generation,
            completion,
        } = tagged;

        match completion {
            Completion::Searched { seq, result } => self.apply_search(seq, result),
            _ if generation != self.generation || self.view.phase != Phase::Resolving => {
                log::debug!(
                    "Discarding result from generation {} (now {})",
                    generation,
                    self.generation
                );
            }
            Completion::Resolved { raw_text, result } => match result {
                Ok(outcome) => self.show_outcome(outcome, raw_text),
                Err(e) => self.show_error(&e),
            },
            Completion::CheckedIn(result) => match result {
                Ok(outcome) => self.show_outcome(outcome, String::new()),
                Err(e) => self.show_error(&e),
            },
            Completion::DayPassRecorded {
                visitor_name,
                result,
            } => match result {
                Ok(()) => {
                    self.view.last_entry_at = Some(self.clock.local_time());
                    self.deadline = Some(self.clock.now() + self.settings.display_delay);
                    let status = format!("Day pass recorded for {}", visitor_name);
                    self.set_phase(Phase::ShowingDayPassRecorded { visitor_name }, status);
                }
                Err(e) => self.show_error(&e),
            },
        }
    }

    fn apply_search(&mut self, seq: u64, result: ResolveResult<Vec<UserMatch>>) {
        if seq != self.search_seq {
            log::trace!("Discarding search #{} (latest #{})", seq, self.search_seq);
            return;
        }
        match result {
            Ok(users) => {
                self.view.search_results = users;
                self.publish();
            }
            Err(e) => {
                self.view.search_results.clear();
                if matches!(
                    self.view.phase,
                    Phase::Scanning | Phase::CameraUnavailable { .. }
                ) {
                    self.pause_scanner();
                    self.show_error(&e);
                } else {
                    self.set_status(e.status_text());
                }
            }
        }
    }

    fn show_outcome(&mut self, outcome: CheckInOutcome, raw_text: String) {
        match outcome {
            CheckInOutcome::KnownUser {
                full_name,
                user_type,
                already_entered_today,
                ..
            } => {
                let status = if already_entered_today {
                    format!("{} has already entered today", full_name)
                } else {
                    self.view.last_entry_at = Some(self.clock.local_time());
                    format!("{} has entered the gym", full_name)
                };
                self.deadline = Some(self.clock.now() + self.settings.display_delay);
                self.set_phase(
                    Phase::ShowingKnownUser {
                        full_name,
                        user_type,
                        already_entered_today,
                    },
                    status,
                );
            }
            CheckInOutcome::DayPassCandidate { suggested_name } => {
                self.set_phase(
                    Phase::ShowingDayPassPrompt { suggested_name },
                    "Day pass: confirm the visitor's name",
                );
            }
            CheckInOutcome::Unrecognized => {
                self.set_phase(
                    Phase::ShowingUnrecognizedPrompt { raw_text },
                    "Code not recognised. Enter the visitor's name to record a day pass.",
                );
            }
        }
    }

    fn show_error(&mut self, error: &ResolveError) {
        log::warn!("Check-in failed: {}", error);
        let message = error.status_text();
        self.deadline = Some(self.clock.now() + self.settings.error_delay);
        self.set_phase(
            Phase::ShowingError {
                message: message.clone(),
            },
            message,
        );
    }

    fn on_deadline(&mut self) {
        self.deadline = None;
        if self.view.phase.is_timed() {
            self.return_to_scanning();
        }
    }

    fn return_to_scanning(&mut self) {
        self.generation += 1;
        self.deadline = None;
        self.view.search_query.clear();
        self.view.search_results.clear();

        match self.scanner.as_mut() {
            Some(scanner) => {
                scanner.resume();
                self.set_phase(Phase::Scanning, STATUS_SCANNING);
            }
            None => {
                let message = self
                    .camera_message
                    .clone()
                    .unwrap_or_else(|| CAMERA_FALLBACK.to_string());
                self.set_phase(
                    Phase::CameraUnavailable {
                        message: message.clone(),
                    },
                    message,
                );
            }
        }
    }

    async fn close(&mut self) {
        self.generation += 1;
        self.deadline = None;
        if let Some(mut scanner) = self.scanner.take() {
            scanner.stop().await;
        }
        self.scan_events = None;
        self.debouncer.reset();
        self.view = SessionView::default();
        self.publish();
        log::info!("Check-in closed");
    }
}

async fn next_scan(events: &mut Option<ScanEventReceiver>) -> Option<ScanEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
