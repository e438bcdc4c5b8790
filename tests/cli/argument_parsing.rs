//! Subcommands and global flags

use super::{argv, settings_from};
use clap::error::ErrorKind;
use lifthub_checkin::api::OperatorRole;
use lifthub_checkin::app::cli::args::{Args, Command};
use lifthub_checkin::app::cli::config::ConfigError;

#[test]
fn test_desk_is_the_default_command() {
    let matches = Args::matches_from(&argv(&["--staff-id", "12"]), false).unwrap();
    let args = <Args as clap::FromArgMatches>::from_arg_matches(&matches).unwrap();

    assert_eq!(args.command, None);
    assert_eq!(args.command_or_default(), Command::Desk);
}

#[tokio::test]
async fn test_explicit_config_file_must_exist() {
    let result = settings_from(&[
        "--config-file",
        "/nonexistent/lifthub.toml",
        "--staff-id",
        "12",
        "--staff-name",
        "Front Desk",
    ])
    .await;

    assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
}

#[test]
fn test_search_collects_all_words() {
    let matches = Args::matches_from(&argv(&["search", "mary", "jane"]), false).unwrap();
    let args = <Args as clap::FromArgMatches>::from_arg_matches(&matches).unwrap();

    assert_eq!(
        args.command,
        Some(Command::Search {
            text: vec!["mary".to_string(), "jane".to_string()]
        })
    );
}

#[test]
fn test_search_requires_text() {
    let err = Args::matches_from(&argv(&["search"]), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_global_flags_after_subcommand() {
    let matches = Args::matches_from(
        &argv(&["logs", "-n", "5", "--staff-id", "3", "--staff-role", "admin"]),
        false,
    )
    .unwrap();
    let args = <Args as clap::FromArgMatches>::from_arg_matches(&matches).unwrap();

    assert_eq!(args.command, Some(Command::Logs { limit: Some(5) }));
    assert_eq!(args.staff_id, Some(3));
    assert_eq!(args.staff_role.as_deref(), Some("admin"));
}

#[test]
fn test_unknown_values_are_rejected_by_clap() {
    for bad in [
        &["--platform", "ios"][..],
        &["--staff-role", "member"][..],
        &["--log-format", "xml"][..],
        &["--color", "--no-color"][..],
    ] {
        assert!(
            Args::matches_from(&argv(bad), false).is_err(),
            "{:?} should not parse",
            bad
        );
    }
}

#[tokio::test]
async fn test_operator_from_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.toml");
    std::fs::write(&empty, "").unwrap();
    let empty = empty.to_string_lossy().to_string();

    let settings = settings_from(&[
        "-c",
        &empty,
        "--staff-id",
        "12",
        "--staff-name",
        " Front Desk ",
        "--staff-role",
        "admin",
    ])
    .await
    .unwrap();

    assert_eq!(settings.operator.id, 12);
    assert_eq!(settings.operator.name, "Front Desk");
    assert_eq!(settings.operator.role, OperatorRole::Admin);

    assert!(matches!(
        settings_from(&["-c", &empty]).await,
        Err(ConfigError::MissingOperator)
    ));
}
