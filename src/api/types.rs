//! Check-in domain types and the JSON shapes exchanged with the LiftHub API

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

/// Account category of a LiftHub user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserType {
    Member,
    Trainer,
    Staff,
    Admin,
    /// Any category this client does not know about
    #[serde(other)]
    Unknown,
}

/// Role of the account operating the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OperatorRole {
    Staff,
    Admin,
}

/// The signed-in staff or admin account; tags every entry it records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub id: u64,
    pub name: String,
    pub role: OperatorRole,
}

/// Where the API server is reached from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    /// Android emulator; the host machine is 10.0.2.2
    Emulator,
    /// Browser build served next to the API
    Web,
    /// Running directly on the API host
    #[default]
    Host,
}

impl Platform {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Platform::Emulator => "http://10.0.2.2/lifthub/api",
            Platform::Web | Platform::Host => "http://localhost/lifthub/api",
        }
    }
}

/// Result of classifying one decoded code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    KnownUser {
        user_id: u64,
        full_name: String,
        user_type: UserType,
        already_entered_today: bool,
    },
    DayPassCandidate {
        suggested_name: String,
    },
    Unrecognized,
}

/// One row of a manual user search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMatch {
    #[serde(deserialize_with = "de_id")]
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub user_name: String,
    pub user_type: UserType,
}

/// A server-side entry log row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: u64,
    pub action: String,
    #[serde(default)]
    pub info: String,
    pub date_time: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub performed_by_user_id: Option<u64>,
    #[serde(default)]
    pub performed_by_name: Option<String>,
}

/// User block inside a QR validation response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrUser {
    #[serde(rename = "userID", deserialize_with = "de_id")]
    pub user_id: u64,
    pub full_name: String,
    pub user_type: UserType,
}

/// `GET validate_qr_code.php`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrValidation {
    pub success: bool,
    #[serde(default)]
    pub user_exists: bool,
    #[serde(default)]
    pub already_entered: bool,
    #[serde(default)]
    pub user: Option<QrUser>,
    #[serde(default)]
    pub is_day_pass: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST add_entry_log.php` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_day_pass: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    pub logged_by: u64,
}

impl EntryLogRequest {
    pub fn member(user_id: u64, logged_by: u64) -> Self {
        Self {
            user_id: Some(user_id),
            is_day_pass: None,
            visitor_name: None,
            logged_by,
        }
    }

    pub fn day_pass(visitor_name: impl Into<String>, logged_by: u64) -> Self {
        Self {
            user_id: None,
            is_day_pass: Some(true),
            visitor_name: Some(visitor_name.into()),
            logged_by,
        }
    }
}

/// `POST add_entry_log.php` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLogResponse {
    pub success: bool,
    #[serde(default)]
    pub already_entered: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET search_users.php`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResponse {
    pub success: bool,
    #[serde(default)]
    pub users: Vec<UserMatch>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET get_logs.php`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub success: bool,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub message: Option<String>,
}

// PHP backends emit numeric ids either as numbers or as numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    fn into_id<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            WireId::Number(n) => Ok(n),
            WireId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id '{}'", s))),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    WireId::deserialize(deserializer)?.into_id()
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<WireId>::deserialize(deserializer)?
        .map(WireId::into_id)
        .transpose()
}
