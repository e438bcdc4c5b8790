//! Resolver Error Types

use crate::core::error_handling::{operator_message, ContextualError};
use crate::core::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Server responded with HTTP {status}")]
    Status { status: u16 },

    #[error("{message}")]
    Rejected { message: String },

    #[error("Malformed response: {message}")]
    Malformed { message: String },

    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
}

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

impl ResolveError {
    /// Short line shown on the desk while the error is displayed
    pub fn status_text(&self) -> String {
        let fallback = match self {
            ResolveError::Network { .. } => "Network error. Please try again.",
            ResolveError::Status { .. } | ResolveError::Malformed { .. } => {
                "Server error. Please try again."
            }
            ResolveError::Rejected { .. } | ResolveError::InvalidInput(_) => "Check-in failed",
        };
        operator_message(self, fallback)
    }

    /// Whether the same request may succeed when sent again
    ///
    /// Connection failures and 5xx answers qualify. Client errors, rejections
    /// and undecodable bodies do not.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolveError::Network { .. } => true,
            ResolveError::Status { status } => *status >= 500,
            ResolveError::Rejected { .. }
            | ResolveError::Malformed { .. }
            | ResolveError::InvalidInput(_) => false,
        }
    }

    pub(crate) fn rejected(message: Option<String>, fallback: &str) -> Self {
        ResolveError::Rejected {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "could not reach the server".to_string()
        } else {
            error.to_string()
        };
        ResolveError::Network { message }
    }
}

impl ContextualError for ResolveError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ResolveError::Rejected { .. } | ResolveError::InvalidInput(_)
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ResolveError::Rejected { message } => Some(message),
            ResolveError::InvalidInput(e) => Some(e.message()),
            _ => None,
        }
    }
}
