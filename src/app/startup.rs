//! Application startup: configuration, logging and command dispatch

use super::cli::args::{Args, Command};
use super::cli::config::{ConfigError, Settings};
use super::cli::display::{print_logs, print_matches};
use super::desk::Desk;
use crate::api::{CheckInApi, CheckInResolver, HttpApiClient, ResolveError, MIN_SEARCH_CHARS};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::StyleRole;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::BufReader;

/// Process exit status for a run that completed
pub const EXIT_OK: i32 = 0;
/// A command failed at runtime (network, server, terminal I/O)
pub const EXIT_FAILURE: i32 = 1;
/// The configuration could not be loaded
pub const EXIT_CONFIG: i32 = 2;

/// Run with the process arguments and return the exit status
pub async fn startup() -> i32 {
    let argv: Vec<String> = std::env::args().collect();
    run(&argv).await
}

/// Run with explicit arguments and return the exit status
pub async fn run(argv: &[String]) -> i32 {
    let matches = match Args::matches_from(argv, std::io::stdout().is_terminal()) {
        Ok(matches) => matches,
        // --help and --version end up here as well
        Err(e) => e.exit(),
    };

    let settings = match load_settings(&matches).await {
        Ok(settings) => settings,
        Err(e) => {
            let use_color = std::io::stderr().is_terminal();
            eprintln!("{}", StyleRole::Error.paint(&e.to_string(), use_color));
            return EXIT_CONFIG;
        }
    };

    if let Err(e) = init_logging(&settings.log) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    log::info!(
        "LiftHub check-in {} starting; API at {}",
        env!("CARGO_PKG_VERSION"),
        settings.api_url
    );
    log::debug!("Settings: {:#?}", settings);

    let client = match HttpApiClient::new(&settings.api_url, settings.timeout, settings.retry.clone()) {
        Ok(client) => client,
        Err(e) => {
            log_error_with_context(&e, "Creating the API client");
            return EXIT_CONFIG;
        }
    };
    let api: Arc<dyn CheckInApi> = Arc::new(client);
    let resolver = Arc::new(CheckInResolver::new(api, settings.operator.clone()));

    match settings.command.clone() {
        Command::Desk => run_desk(resolver, &settings).await,
        Command::Search { text } => run_search(&resolver, &text.join(" "), settings.color).await,
        Command::Logs { limit } => run_logs(&resolver, limit, settings.color).await,
    }
}

async fn load_settings(matches: &clap::ArgMatches) -> Result<Settings, ConfigError> {
    let args = Args::from_matches_with_config(matches).await?;
    Settings::from_args(&args)
}

async fn run_desk(resolver: Arc<CheckInResolver>, settings: &Settings) -> i32 {
    let session_settings = settings.session.clone();
    let use_color = settings.color;

    let result = ShutdownCoordinator::guard(|shutdown_rx| async move {
        let mut desk = Desk::new(resolver, session_settings, std::io::stdout(), use_color);
        desk.run(BufReader::new(tokio::io::stdin()), shutdown_rx).await
    })
    .await;

    match result {
        Ok(()) => {
            log::info!("Check-in desk closed");
            EXIT_OK
        }
        Err(e) => {
            log::error!("FATAL: Terminal I/O failed: {}", e);
            EXIT_FAILURE
        }
    }
}

async fn run_search(resolver: &CheckInResolver, query: &str, use_color: bool) -> i32 {
    if query.trim().chars().count() < MIN_SEARCH_CHARS {
        println!(
            "{}",
            StyleRole::Notice.paint(
                &format!("Type at least {} characters to search.", MIN_SEARCH_CHARS),
                use_color
            )
        );
        return EXIT_OK;
    }

    match resolver.search_by_name(query).await {
        Ok(matches) => {
            let users: Vec<_> = matches.collect();
            print_or_fail(print_matches(&users, use_color))
        }
        Err(e) => report(&e, "Searching users"),
    }
}

async fn run_logs(resolver: &CheckInResolver, limit: Option<usize>, use_color: bool) -> i32 {
    match resolver.recent_logs().await {
        Ok(mut logs) => {
            if let Some(limit) = limit {
                logs.truncate(limit);
            }
            print_or_fail(print_logs(&logs, use_color))
        }
        Err(e) => report(&e, "Fetching entry logs"),
    }
}

fn report(error: &ResolveError, context: &str) -> i32 {
    log_error_with_context(error, context);
    eprintln!(
        "{}",
        StyleRole::Error.paint(&error.status_text(), std::io::stderr().is_terminal())
    );
    EXIT_FAILURE
}

fn print_or_fail(result: std::io::Result<()>) -> i32 {
    match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            log::error!("FATAL: Could not write output: {}", e);
            EXIT_FAILURE
        }
    }
}
