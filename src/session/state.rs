//! Session view published to the desk

use crate::api::{UserMatch, UserType};
use chrono::{DateTime, Local};

pub const STATUS_SCANNING: &str = "Scan a member QR code";
pub const STATUS_RESOLVING: &str = "Checking code...";

/// Where the check-in screen currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// No session open, or the session has closed
    #[default]
    Idle,
    CameraUnavailable {
        message: String,
    },
    Scanning,
    /// A resolve, entry or check-in call is in flight; the scanner is paused
    Resolving,
    ShowingKnownUser {
        full_name: String,
        user_type: UserType,
        already_entered_today: bool,
    },
    ShowingDayPassPrompt {
        suggested_name: String,
    },
    ShowingUnrecognizedPrompt {
        raw_text: String,
    },
    ShowingDayPassRecorded {
        visitor_name: String,
    },
    ShowingError {
        message: String,
    },
}

impl Phase {
    /// Phases that return to scanning on their own
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            Phase::ShowingKnownUser { .. }
                | Phase::ShowingDayPassRecorded { .. }
                | Phase::ShowingError { .. }
        )
    }

    /// Phases waiting for the operator to confirm or cancel
    pub fn is_prompt(&self) -> bool {
        matches!(
            self,
            Phase::ShowingDayPassPrompt { .. } | Phase::ShowingUnrecognizedPrompt { .. }
        )
    }
}

/// Everything the screen renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub phase: Phase,
    pub status: String,
    pub search_query: String,
    pub search_results: Vec<UserMatch>,
    /// Wall-clock time of the last recorded entry in this session
    pub last_entry_at: Option<DateTime<Local>>,
}
