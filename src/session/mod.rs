//! Check-in Session
//!
//! The screen-level controller. A session is opened when the check-in screen
//! opens and is closed (terminally) when it closes; the next opening gets a
//! fresh session, scanner and debouncer.
//!
//! Observers follow the published [`SessionView`] through a `watch` channel
//! and steer the session with [`SessionCommand`]s.

pub mod command;
pub mod controller;
pub mod state;

pub use command::SessionCommand;
pub use controller::{
    CheckInSession, SessionSettings, DEFAULT_DISPLAY_DELAY, DEFAULT_ERROR_DELAY,
    DEFAULT_SURFACE_ID,
};
pub use state::{Phase, SessionView, STATUS_RESOLVING, STATUS_SCANNING};
