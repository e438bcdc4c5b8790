//! Scanner Error Types

/// Camera acquisition failures reported by `ScannerHandle::initialize`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    /// The platform refused camera access
    #[error("Camera permission denied")]
    PermissionDenied,
    /// No camera device is available
    #[error("No camera found")]
    NoCamera,
    /// Camera start was interrupted or the device is held elsewhere
    #[error("Camera start aborted: {reason}")]
    Aborted { reason: String },
}

impl crate::core::error_handling::ContextualError for InitError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(match self {
            InitError::PermissionDenied => {
                "Camera permission denied. Allow camera access, then retry."
            }
            InitError::NoCamera => "No camera found. Connect a scanner, then retry.",
            InitError::Aborted { .. } => "Camera could not be started. Retry or reopen check-in.",
        })
    }
}

/// Faults raised by a camera stream while decoding
///
/// These never reach the operator; the decode loop logs them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Camera device fault: {message}")]
    Fault { message: String },
    #[error("Camera stream closed")]
    Closed,
}
