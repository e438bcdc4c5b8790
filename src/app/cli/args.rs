//! Command line arguments
//!
//! Every setting is optional here so that values from the configuration file
//! can sit underneath whatever was given on the command line. Settings that
//! only make sense in a config file are `#[arg(skip)]` fields.

use crate::core::styles::palette_to_clap;
use clap::{ArgMatches, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Global arguments structure with all command-line options
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "lifthub-checkin")]
#[command(about = "LiftHub front-desk QR check-in")]
#[command(version, long_version = crate::core::version::long_version())]
#[command(
    after_help = "Lines typed at the desk (or sent by a keyboard-wedge scanner) are scans.\nType :help at the desk for the list of commands."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// API base URL (overrides --platform)
    #[arg(short = 'u', long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Where the API is reached from
    #[arg(short = 'p', long = "platform", value_name = "PLATFORM", value_parser = ["emulator", "web", "host"], global = true)]
    pub platform: Option<String>,

    /// User id of the staff member operating the desk
    #[arg(long = "staff-id", value_name = "ID", global = true)]
    pub staff_id: Option<u64>,

    /// Name of the staff member operating the desk
    #[arg(long = "staff-name", value_name = "NAME", global = true)]
    pub staff_name: Option<String>,

    /// Role of the operating account
    #[arg(long = "staff-role", value_name = "ROLE", value_parser = ["staff", "admin"], global = true)]
    pub staff_role: Option<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"], global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"], global = true)]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", conflicts_with = "no_color", global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[arg(skip)]
    pub config_color: Option<bool>,

    #[arg(skip)]
    pub timeout_secs: Option<u64>,

    #[arg(skip)]
    pub retry_attempts: Option<u64>,

    #[arg(skip)]
    pub retry_delay_ms: Option<u64>,

    #[arg(skip)]
    pub scan_fps: Option<u64>,

    #[arg(skip)]
    pub scan_region: Option<String>,

    #[arg(skip)]
    pub debounce_ms: Option<u64>,

    #[arg(skip)]
    pub display_delay_ms: Option<u64>,

    #[arg(skip)]
    pub error_delay_ms: Option<u64>,
}

/// What to run
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the interactive check-in desk (default)
    Desk,
    /// Search users by name
    Search {
        /// Part of the user's name (at least 2 characters)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show recent gym entry logs
    Logs {
        /// Show at most this many entries
        #[arg(short = 'n', long = "limit", value_name = "COUNT")]
        limit: Option<usize>,
    },
}

impl Args {
    /// Parse `argv` into raw matches, styling help output when `styled`
    pub fn matches_from(argv: &[String], styled: bool) -> Result<ArgMatches, clap::Error> {
        Self::command()
            .styles(palette_to_clap(styled))
            .try_get_matches_from(argv)
    }

    /// Subcommand to run, defaulting to the desk
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Desk)
    }

    /// Resolve color: CLI flags, then the config file, then TTY detection
    pub fn use_color(&self) -> bool {
        if self.color {
            return true;
        }
        if self.no_color {
            return false;
        }
        self.config_color
            .unwrap_or_else(|| std::io::IsTerminal::is_terminal(&std::io::stdout()))
    }
}
