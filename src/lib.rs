//! LiftHub front-desk QR check-in
//!
//! A staff member opens the check-in screen, the camera decodes a member's or
//! visitor's QR code, and the desk records the gym entry through the LiftHub
//! HTTP API.

pub mod api;
pub mod app;
pub mod core;
pub mod debounce;
pub mod scanner;
pub mod session;
