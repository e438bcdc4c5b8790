//! Interactive check-in desk
//!
//! Reads lines from the terminal. A keyboard-wedge scanner types the decoded
//! text followed by Enter, so any plain line is handed to the camera feed as a
//! decoded frame. Lines starting with `:` are operator commands.

use crate::api::CheckInResolver;
use crate::app::cli::display::render_matches;
use crate::core::logging::set_log_level;
use crate::core::strings::title_case;
use crate::core::styles::StyleRole;
use crate::scanner::{CameraDevice, FrameFeed, FrameFeedCamera};
use crate::session::{CheckInSession, Phase, SessionCommand, SessionSettings, SessionView};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast, watch};

const HELP: &str = "\
Scan a code, or type one of:
  :confirm [name]   record the day pass (optionally under another name)
  :cancel           dismiss the current prompt or result
  :search <text>    find users by name
  :select <n>       check in search result n
  :retry            try the camera again
  :close            close check-in
  :open             open check-in again
  :log <level>      change the log level
  :quit             exit";

/// One line of desk input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskInput {
    /// Decoded text from the scanner (or typed by hand)
    Scan(String),
    Command(SessionCommand),
    Open,
    LogLevel(String),
    Help,
    Quit,
    Empty,
    /// Unusable input with a message for the operator
    Invalid(String),
}

/// Classify one input line
pub fn parse_line(line: &str) -> DeskInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return DeskInput::Empty;
    }
    let Some(command_line) = trimmed.strip_prefix(':') else {
        return DeskInput::Scan(line.trim_end_matches(&['\r', '\n'][..]).to_string());
    };

    let (command, rest) = match command_line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (command_line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "confirm" | "c" => DeskInput::Command(SessionCommand::ConfirmDayPass {
            name: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "cancel" | "x" => DeskInput::Command(SessionCommand::Cancel),
        "search" | "s" => DeskInput::Command(SessionCommand::Search(rest.to_string())),
        "select" | "n" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => DeskInput::Command(SessionCommand::SelectMatch(n - 1)),
            _ => DeskInput::Invalid("Usage: :select <number from the search results>".to_string()),
        },
        "retry" => DeskInput::Command(SessionCommand::RetryCamera),
        "close" => DeskInput::Command(SessionCommand::Close),
        "open" => DeskInput::Open,
        "log" if !rest.is_empty() => DeskInput::LogLevel(rest.to_string()),
        "log" => DeskInput::Invalid("Usage: :log <trace|debug|info|warn|error>".to_string()),
        "help" | "h" | "?" => DeskInput::Help,
        "quit" | "q" | "exit" => DeskInput::Quit,
        other => DeskInput::Invalid(format!("Unknown command ':{}'. Type :help", other)),
    }
}

/// The terminal front end around a [`CheckInSession`]
pub struct Desk<W: Write> {
    resolver: Arc<CheckInResolver>,
    settings: SessionSettings,
    out: W,
    use_color: bool,
    last_rendered: Option<SessionView>,
}

impl<W: Write> Desk<W> {
    pub fn new(
        resolver: Arc<CheckInResolver>,
        settings: SessionSettings,
        out: W,
        use_color: bool,
    ) -> Self {
        Self {
            resolver,
            settings,
            out,
            use_color,
            last_rendered: None,
        }
    }

    /// Consume the writer, e.g. to inspect captured output
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run until `:quit`, end of input, or a shutdown signal
    pub async fn run<R>(
        &mut self,
        input: R,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let (camera, feed) = FrameFeedCamera::new();
        let device: Arc<dyn CameraDevice> = Arc::new(camera);
        let mut lines = input.lines();

        let operator = self.resolver.operator().clone();
        self.line(
            StyleRole::Header,
            &format!(
                "LiftHub check-in ({}, {})",
                operator.name,
                title_case(&operator.role.to_string())
            ),
        )?;

        let mut session = Some(self.open_session(&device));
        let mut views = session.as_ref().map(CheckInSession::subscribe);

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        let keep_going = self
                            .handle_input(parse_line(&line), &device, &feed, &mut session, &mut views)
                            .await?;
                        if !keep_going {
                            break;
                        }
                    }
                    None => break,
                },
                view = next_view(&mut views) => match view {
                    Some(view) => self.render(&view)?,
                    None => views = None,
                },
                _ = shutdown.recv() => {
                    log::info!("Shutdown requested; closing check-in");
                    break;
                }
            }
        }

        if let Some(session) = session.take() {
            session.close().await;
        }
        self.out.flush()
    }

    fn open_session(&mut self, device: &Arc<dyn CameraDevice>) -> CheckInSession {
        self.last_rendered = None;
        CheckInSession::open(device.clone(), self.resolver.clone(), self.settings.clone())
    }

    // Returns false when the desk should exit
    async fn handle_input(
        &mut self,
        input: DeskInput,
        device: &Arc<dyn CameraDevice>,
        feed: &FrameFeed,
        session: &mut Option<CheckInSession>,
        views: &mut Option<watch::Receiver<SessionView>>,
    ) -> std::io::Result<bool> {
        match input {
            DeskInput::Empty => {}
            DeskInput::Quit => return Ok(false),
            DeskInput::Help => self.line(StyleRole::Dim, HELP)?,
            DeskInput::Invalid(message) => self.line(StyleRole::Error, &message)?,
            DeskInput::LogLevel(level) => match set_log_level(&level) {
                Ok(()) => self.line(StyleRole::Dim, &format!("Log level set to {}", level))?,
                Err(e) => self.line(StyleRole::Error, &format!("Could not change log level: {}", e))?,
            },
            DeskInput::Open => {
                if session.is_some() {
                    self.line(StyleRole::Notice, "Check-in is already open")?;
                } else {
                    let opened = self.open_session(device);
                    *views = Some(opened.subscribe());
                    *session = Some(opened);
                }
            }
            DeskInput::Command(SessionCommand::Close) => match session.take() {
                Some(open) => {
                    *views = None;
                    let view = open.close().await;
                    self.render(&view)?;
                }
                None => self.line(StyleRole::Notice, "Check-in is already closed")?,
            },
            DeskInput::Command(command) => {
                let delivered = session
                    .as_ref()
                    .map(|open| open.send(command))
                    .unwrap_or(false);
                if !delivered {
                    self.line(StyleRole::Notice, "Check-in is closed. Type :open to start.")?;
                }
            }
            DeskInput::Scan(text) => {
                if session.is_none() {
                    self.line(StyleRole::Notice, "Check-in is closed. Type :open to start.")?;
                } else if !feed.push(text) {
                    log::warn!("Scanner feed is gone; scan dropped");
                }
            }
        }
        Ok(true)
    }

    fn line(&mut self, role: StyleRole, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", role.paint(text, self.use_color))
    }

    fn render(&mut self, view: &SessionView) -> std::io::Result<()> {
        let previous = self.last_rendered.replace(view.clone());
        let phase_changed = previous
            .as_ref()
            .map(|p| p.phase != view.phase || p.status != view.status)
            .unwrap_or(true);
        let results_changed = previous
            .as_ref()
            .map(|p| p.search_results != view.search_results)
            .unwrap_or(false);

        if phase_changed {
            self.render_phase(view)?;
        }
        if results_changed && !view.search_query.trim().is_empty() {
            let table = render_matches(&view.search_results);
            writeln!(self.out, "{}", table.trim_end())?;
        }
        self.out.flush()
    }

    fn render_phase(&mut self, view: &SessionView) -> std::io::Result<()> {
        match &view.phase {
            Phase::Idle => self.line(
                StyleRole::Dim,
                "Check-in closed. Type :open to start again or :quit to exit.",
            ),
            Phase::CameraUnavailable { message } => {
                self.line(StyleRole::Error, message)?;
                self.line(StyleRole::Dim, "Type :retry to try the camera again.")
            }
            Phase::Scanning => self.line(StyleRole::Prompt, &view.status),
            Phase::Resolving => self.line(StyleRole::Dim, &view.status),
            Phase::ShowingKnownUser { user_type, .. } => self.line(
                StyleRole::Success,
                &format!("{} ({})", view.status, title_case(&user_type.to_string())),
            ),
            Phase::ShowingDayPassPrompt { suggested_name } => {
                self.line(StyleRole::Notice, &view.status)?;
                let hint = if suggested_name.is_empty() {
                    "Type :confirm <name> or :cancel".to_string()
                } else {
                    format!(
                        "Visitor: {}. Type :confirm, :confirm <name> or :cancel",
                        suggested_name
                    )
                };
                self.line(StyleRole::Dim, &hint)
            }
            Phase::ShowingUnrecognizedPrompt { .. } => {
                self.line(StyleRole::Notice, &view.status)?;
                self.line(StyleRole::Dim, "Type :confirm <name> or :cancel")
            }
            Phase::ShowingDayPassRecorded { .. } => self.line(StyleRole::Success, &view.status),
            Phase::ShowingError { .. } => self.line(StyleRole::Error, &view.status),
        }
    }
}

async fn next_view(views: &mut Option<watch::Receiver<SessionView>>) -> Option<SessionView> {
    match views {
        Some(views) => match views.changed().await {
            Ok(()) => Some(views.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}
