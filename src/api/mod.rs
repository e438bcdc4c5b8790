//! LiftHub API access and check-in resolution
//!
//! - [`CheckInApi`]: the four remote endpoints the desk uses, with a reqwest
//!   implementation in [`HttpApiClient`]
//! - [`CheckInResolver`]: classifies decoded text into a [`CheckInOutcome`]
//!   and records entries for the signed-in [`Operator`]

pub mod client;
pub mod error;
pub mod resolver;
pub mod types;

pub use client::{CheckInApi, HttpApiClient, DEFAULT_TIMEOUT};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{tagged_visitor_name, CheckInResolver, UserMatches, MIN_SEARCH_CHARS};
pub use types::{
    CheckInOutcome, EntryLogRequest, EntryLogResponse, LogEntry, LogsResponse, Operator,
    OperatorRole, Platform, QrUser, QrValidation, UserMatch, UserSearchResponse, UserType,
};
