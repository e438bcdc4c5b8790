//! Core services and infrastructure

pub mod error_handling;
pub mod logging;
pub mod retry;
pub mod shutdown;
pub mod strings;
pub mod styles; // terminal palette shared by the desk and table output
pub mod time;
pub mod validation;
pub mod version;
