//! TOML configuration file parsing and settings resolution
//!
//! Precedence is command line, then config file, then built-in defaults. The
//! config file is applied to a default `Args` first and the command line
//! matches are layered over it afterwards.

use crate::api::{Operator, OperatorRole, Platform, DEFAULT_TIMEOUT};
use crate::core::error_handling::ContextualError;
use crate::core::logging::{LogFormat, LogSettings};
use crate::core::retry::RetryPolicy;
use crate::core::validation::{validate_base_url, ValidationError};
use crate::scanner::{DecodeConfig, DecodeRegion};
use crate::session::SessionSettings;
use clap::{ArgMatches, FromArgMatches};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::args::{Args, Command};

/// Highest decode rate accepted from configuration
pub const MAX_SCAN_FPS: u64 = 60;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration loading failures; fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Error in configuration file {}: {source}", path.display())]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("No desk operator configured. Set staff-id and staff-name on the command line or in the config file.")]
    MissingOperator,

    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid(e) | ConfigError::InvalidFile { source: e, .. } => {
                Some(e.message())
            }
            ConfigError::MissingOperator => Some(
                "No desk operator configured. Set staff-id and staff-name on the command line or in the config file.",
            ),
            _ => None,
        }
    }
}

/// Default config file location: `<config_dir>/LiftHub/lifthub.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("LiftHub").join("lifthub.toml"))
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub command: Command,
    pub api_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub operator: Operator,
    pub session: SessionSettings,
    pub log: LogSettings,
    pub color: bool,
}

impl Args {
    /// Build the final arguments: defaults, then config file, then command line
    pub async fn from_matches_with_config(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let cli = Self::from_arg_matches(matches)?;

        let mut args = Self::default();
        if let Some((path, config)) = Self::parse_config_file(cli.config_file.clone()).await? {
            Self::apply_toml_values(&mut args, &config)
                .map_err(|source| ConfigError::InvalidFile { path, source })?;
        }
        args.update_from_arg_matches(matches)?;
        Ok(args)
    }

    /// Load the config file, if any
    ///
    /// An explicitly named file must exist; the default location is optional.
    pub async fn parse_config_file(
        config_file: Option<PathBuf>,
    ) -> Result<Option<(PathBuf, toml::Table)>, ConfigError> {
        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile { path });
                }
                path
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        log::debug!("Loading configuration from {}", config_path.display());
        let contents = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
        let config = toml::from_str::<toml::Table>(&contents).map_err(|e| ConfigError::Parse {
            path: config_path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some((config_path, config)))
    }

    /// Apply TOML configuration values to Args
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ValidationError> {
        if let Some(api_url) = toml_str(config, "api-url")? {
            args.api_url = Some(api_url.to_string());
        }
        if let Some(platform) = toml_str(config, "platform")? {
            args.platform = Some(platform.to_string());
        }
        if let Some(staff_id) = toml_u64(config, "staff-id")? {
            args.staff_id = Some(staff_id);
        }
        if let Some(staff_name) = toml_str(config, "staff-name")? {
            args.staff_name = Some(staff_name.to_string());
        }
        if let Some(staff_role) = toml_str(config, "staff-role")? {
            args.staff_role = Some(staff_role.to_string());
        }

        args.timeout_secs = toml_u64(config, "timeout-secs")?.or(args.timeout_secs);
        args.retry_attempts = toml_u64(config, "retry-attempts")?.or(args.retry_attempts);
        args.retry_delay_ms = toml_u64(config, "retry-delay-ms")?.or(args.retry_delay_ms);
        args.scan_fps = toml_u64(config, "scan-fps")?.or(args.scan_fps);
        args.debounce_ms = toml_u64(config, "debounce-ms")?.or(args.debounce_ms);
        args.display_delay_ms = toml_u64(config, "display-delay-ms")?.or(args.display_delay_ms);
        args.error_delay_ms = toml_u64(config, "error-delay-ms")?.or(args.error_delay_ms);

        // scan-region = "320x240" or scan-region = 300
        if let Some(region) = config.get("scan-region") {
            args.scan_region = match (region.as_str(), region.as_integer()) {
                (Some(text), _) => Some(text.to_string()),
                (None, Some(edge)) => Some(edge.to_string()),
                _ => {
                    return Err(ValidationError::new(
                        "scan-region must be a string like \"250x250\" or an integer",
                    ))
                }
            };
        }

        if let Some(log_level) = toml_str(config, "log-level")? {
            let level = log_level.to_ascii_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ValidationError::new(format!(
                    "log-level must be one of {}",
                    LOG_LEVELS.join(", ")
                )));
            }
            args.log_level = Some(level);
        }
        if let Some(log_file) = toml_str(config, "log-file")? {
            if log_file.eq_ignore_ascii_case("none") || log_file == "-" {
                args.log_file = None; // Magic values "none" and "-" disable file logging
            } else {
                args.log_file = Some(PathBuf::from(log_file));
            }
        }
        if let Some(log_format) = toml_str(config, "log-format")? {
            args.log_format = Some(log_format.to_string());
        }
        if let Some(color) = config.get("color") {
            let color = color
                .as_bool()
                .ok_or_else(|| ValidationError::new("color must be true or false"))?;
            args.config_color = Some(color);
        }

        Ok(())
    }
}

fn toml_str<'a>(config: &'a toml::Table, key: &str) -> Result<Option<&'a str>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ValidationError::new(format!("{} must be a string", key))),
    }
}

fn toml_u64(config: &toml::Table, key: &str) -> Result<Option<u64>, ValidationError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => match value.as_integer() {
            Some(n) if n >= 0 => Ok(Some(n as u64)),
            _ => Err(ValidationError::new(format!(
                "{} must be a non-negative integer",
                key
            ))),
        },
    }
}

impl Settings {
    /// Apply defaults and validate the merged arguments
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let platform = match args.platform.as_deref() {
            Some(name) => Platform::from_str(name).map_err(|_| {
                ValidationError::new(format!(
                    "Unknown platform '{}': expected emulator, web or host",
                    name
                ))
            })?,
            None => Platform::default(),
        };
        let api_url = validate_base_url(
            args.api_url
                .as_deref()
                .unwrap_or_else(|| platform.default_base_url()),
        )?;

        let timeout = match args.timeout_secs {
            Some(0) => return Err(ValidationError::new("timeout-secs must be at least 1").into()),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };
        let retry_defaults = RetryPolicy::default();
        let retry = RetryPolicy::new(
            args.retry_attempts
                .map(|n| n as usize)
                .unwrap_or(retry_defaults.max_attempts),
            args.retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(retry_defaults.delay),
        );

        let operator = resolve_operator(args)?;
        let session = resolve_session(args)?;

        let log = LogSettings {
            level: args.log_level.clone().unwrap_or_else(|| "info".to_string()),
            format: match args.log_format.as_deref() {
                Some(format) => LogFormat::from_str(format).map_err(|_| {
                    ValidationError::new(format!(
                        "Unknown log-format '{}': expected text, ext or json",
                        format
                    ))
                })?,
                None => LogFormat::default(),
            },
            file: args
                .log_file
                .clone()
                .filter(|path| !is_disabled_log_file(path)),
            color: args.use_color(),
        };

        Ok(Self {
            command: args.command_or_default(),
            api_url,
            timeout,
            retry,
            operator,
            session,
            color: log.color,
            log,
        })
    }
}

fn is_disabled_log_file(path: &Path) -> bool {
    let text = path.to_string_lossy();
    text.eq_ignore_ascii_case("none") || text == "-"
}

fn resolve_operator(args: &Args) -> Result<Operator, ConfigError> {
    let name = args
        .staff_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match (args.staff_id, name) {
        (Some(id), Some(name)) => {
            let role = match args.staff_role.as_deref() {
                Some(role) => OperatorRole::from_str(role).map_err(|_| {
                    ValidationError::new("staff-role must be 'staff' or 'admin'")
                })?,
                None => OperatorRole::Staff,
            };
            Ok(Operator {
                id,
                name: name.to_string(),
                role,
            })
        }
        (None, None) => Err(ConfigError::MissingOperator),
        _ => Err(ValidationError::new("staff-id and staff-name must be given together").into()),
    }
}

fn resolve_session(args: &Args) -> Result<SessionSettings, ConfigError> {
    let defaults = SessionSettings::default();

    let fps = match args.scan_fps {
        Some(fps) if fps == 0 || fps > MAX_SCAN_FPS => {
            return Err(ValidationError::new(format!(
                "scan-fps must be between 1 and {}",
                MAX_SCAN_FPS
            ))
            .into())
        }
        Some(fps) => fps as u32,
        None => defaults.decode.fps,
    };
    let region = match args.scan_region.as_deref() {
        Some(region) => DecodeRegion::from_str(region).map_err(ValidationError::new)?,
        None => defaults.decode.region,
    };
    let millis = |value: Option<u64>, default: Duration| {
        value.map(Duration::from_millis).unwrap_or(default)
    };

    Ok(SessionSettings {
        decode: DecodeConfig { fps, region },
        debounce_gate: millis(args.debounce_ms, defaults.debounce_gate),
        display_delay: millis(args.display_delay_ms, defaults.display_delay),
        error_delay: millis(args.error_delay_ms, defaults.error_delay),
        ..defaults
    })
}
