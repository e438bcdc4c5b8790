//! Config file loading and precedence: command line, then file, then defaults

use super::settings_from;
use lifthub_checkin::api::OperatorRole;
use lifthub_checkin::app::cli::config::ConfigError;
use lifthub_checkin::core::logging::LogFormat;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().to_string()
}

const DESK_CONFIG: &str = r#"
api-url = "http://192.168.1.20/lifthub/api"
staff-id = 7
staff-name = "Alex"
staff-role = "admin"
retry-attempts = 3
retry-delay-ms = 250
debounce-ms = 1500
error-delay-ms = 4000
scan-region = "320x240"
log-format = "json"
log-file = "/var/log/lifthub/desk.log"
"#;

#[tokio::test]
async fn test_file_values_fill_in_defaults() {
    let file = config_file(DESK_CONFIG);

    let settings = settings_from(&["-c", &path_of(&file)]).await.unwrap();

    assert_eq!(settings.api_url, "http://192.168.1.20/lifthub/api");
    assert_eq!(settings.operator.id, 7);
    assert_eq!(settings.operator.name, "Alex");
    assert_eq!(settings.operator.role, OperatorRole::Admin);
    assert_eq!(settings.retry.max_attempts, 3);
    assert_eq!(settings.retry.delay, Duration::from_millis(250));
    assert_eq!(settings.session.debounce_gate, Duration::from_millis(1500));
    assert_eq!(settings.session.error_delay, Duration::from_millis(4000));
    assert_eq!(settings.session.decode.region.to_string(), "320x240");
    assert_eq!(settings.log.format, LogFormat::Json);
    assert_eq!(
        settings.log.file,
        Some(PathBuf::from("/var/log/lifthub/desk.log"))
    );
}

#[tokio::test]
async fn test_command_line_wins_over_file() {
    let file = config_file(DESK_CONFIG);

    let settings = settings_from(&[
        "-c",
        &path_of(&file),
        "--staff-name",
        "Bo",
        "--staff-role",
        "staff",
        "--api-url",
        "https://gym.example.com/api",
        "--log-file",
        "none",
        "search",
        "jane",
    ])
    .await
    .unwrap();

    assert_eq!(settings.operator.id, 7);
    assert_eq!(settings.operator.name, "Bo");
    assert_eq!(settings.operator.role, OperatorRole::Staff);
    assert_eq!(settings.api_url, "https://gym.example.com/api");
    assert_eq!(settings.log.file, None);
    assert_eq!(settings.retry.max_attempts, 3);
}

#[tokio::test]
async fn test_platform_in_file_picks_the_base_url() {
    let file = config_file("platform = \"emulator\"\nstaff-id = 1\nstaff-name = \"Desk\"\n");

    let settings = settings_from(&["-c", &path_of(&file)]).await.unwrap();

    assert_eq!(settings.api_url, "http://10.0.2.2/lifthub/api");
}

#[tokio::test]
async fn test_unparseable_file_is_reported() {
    let file = config_file("staff-id = [unclosed");

    let result = settings_from(&["-c", &path_of(&file)]).await;

    match result {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_value_names_the_file() {
    let file = config_file("staff-id = 1\nstaff-name = \"Desk\"\ncolor = \"yes\"\n");

    let result = settings_from(&["-c", &path_of(&file)]).await;

    match result {
        Err(ConfigError::InvalidFile { path, source }) => {
            assert_eq!(path, file.path());
            assert_eq!(source.message(), "color must be true or false");
        }
        other => panic!("expected an invalid file error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scan_rate_is_bounded() {
    let file = config_file("staff-id = 1\nstaff-name = \"Desk\"\nscan-fps = 120\n");

    let result = settings_from(&["-c", &path_of(&file)]).await;

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
