//! Validation of decoded scan text, operator input and configuration values

use thiserror::Error;

/// Longest decoded payload accepted from the scanner
pub const MAX_SCAN_TEXT_LEN: usize = 256;

/// Longest visitor name accepted for a day pass
pub const MAX_VISITOR_NAME_LEN: usize = 100;

/// Validation failure with an operator-readable message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate raw decoder output, returning the trimmed payload
///
/// Empty text, control characters and oversized payloads are garbage reads;
/// callers drop them silently.
pub fn validate_scan_text(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Decoded text is empty"));
    }
    if trimmed.len() > MAX_SCAN_TEXT_LEN {
        return Err(ValidationError::new(format!(
            "Decoded text exceeds {} bytes",
            MAX_SCAN_TEXT_LEN
        )));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::new("Decoded text contains control characters"));
    }
    Ok(trimmed)
}

/// Validate an operator-entered day-pass visitor name, returning it trimmed
pub fn validate_visitor_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Please enter the visitor's name"));
    }
    if trimmed.chars().count() > MAX_VISITOR_NAME_LEN {
        return Err(ValidationError::new(format!(
            "Visitor name must be at most {} characters",
            MAX_VISITOR_NAME_LEN
        )));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::new("Visitor name contains invalid characters"));
    }
    Ok(trimmed.to_string())
}

/// Validate an API base URL
pub fn validate_base_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| {
            ValidationError::new(format!(
                "Invalid API URL scheme. Only http:// and https:// are supported: {}",
                url
            ))
        })?;
    if host.is_empty() {
        return Err(ValidationError::new(format!("API URL has no host: {}", url)));
    }
    Ok(trimmed.to_string())
}
