//! Operator commands accepted by a running session

/// Something the operator did on the check-in screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Create a day-pass entry, optionally overriding the suggested name
    ConfirmDayPass { name: Option<String> },
    /// Dismiss the current prompt or outcome and go back to scanning
    Cancel,
    /// Replace the manual search results with matches for this text
    Search(String),
    /// Check in the search result at this zero-based index
    SelectMatch(usize),
    /// Try to acquire the camera again after it was unavailable
    RetryCamera,
    /// Stop the scanner and end the session
    Close,
}
