//! Generic error handling utilities
//!
//! Every error in the check-in workflow ends up either as a short status line
//! on the desk screen or as a fatal startup message. Both go through here so
//! operators see actionable text and the log keeps the details.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a short message an operator can act on. When it
/// returns `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message meant for the operator
    ///
    /// Examples: camera permission refused, server rejected a check-in,
    /// configuration value out of range.
    ///
    /// Counter-examples: connection resets, undecodable response bodies.
    fn is_user_actionable(&self) -> bool;

    /// Returns the operator-facing message for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Pick the text an operator should see for `error`
///
/// User-actionable errors show their own message, everything else shows the
/// generic `fallback`. The full error is logged at debug level.
pub fn operator_message<E: ContextualError + std::fmt::Debug>(error: &E, fallback: &str) -> String {
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
    match error.user_message() {
        Some(msg) if error.is_user_actionable() => msg.to_string(),
        _ => fallback.to_string(),
    }
}

/// Log a fatal error with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use lifthub_checkin::core::error_handling::log_error_with_context;
/// # use lifthub_checkin::core::validation::ValidationError;
/// let err = ValidationError::new("staff-role must be 'staff' or 'admin'");
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: staff-role must be 'staff' or 'admin'"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
