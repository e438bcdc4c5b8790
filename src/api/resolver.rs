//! Check-in resolver
//!
//! Turns decoded QR text into a [`CheckInOutcome`], recording the gym entry
//! for known users on the way, and backs the desk's manual search and
//! day-pass paths.

use crate::api::client::CheckInApi;
use crate::api::error::{ResolveError, ResolveResult};
use crate::api::types::{CheckInOutcome, EntryLogRequest, LogEntry, Operator, UserMatch};
use crate::core::validation::{validate_scan_text, validate_visitor_name};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Shortest trimmed query sent to `search_users`
pub const MIN_SEARCH_CHARS: usize = 2;

// LIFTHUB-<TAG>-<name>; the name keeps any further hyphens
static TAGGED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^LIFTHUB-[^-]+-(.+)$").expect("tagged QR pattern is valid")
});

/// Visitor name carried by a `LIFTHUB-<TAG>-<name>` payload
pub fn tagged_visitor_name(raw_text: &str) -> Option<String> {
    TAGGED_NAME
        .captures(raw_text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Finite, consume-once results of a manual search
#[derive(Debug)]
pub struct UserMatches {
    inner: std::vec::IntoIter<UserMatch>,
}

impl UserMatches {
    pub fn empty() -> Self {
        Self::from(Vec::new())
    }
}

impl From<Vec<UserMatch>> for UserMatches {
    fn from(users: Vec<UserMatch>) -> Self {
        Self {
            inner: users.into_iter(),
        }
    }
}

impl Iterator for UserMatches {
    type Item = UserMatch;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for UserMatches {}

/// Classifies scans and records entries on behalf of one operator
pub struct CheckInResolver {
    api: Arc<dyn CheckInApi>,
    operator: Operator,
}

impl CheckInResolver {
    pub fn new(api: Arc<dyn CheckInApi>, operator: Operator) -> Self {
        Self { api, operator }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Classify decoded text, recording an entry for a known user who has not
    /// entered yet today
    pub async fn resolve(&self, raw_text: &str) -> ResolveResult<CheckInOutcome> {
        let text = validate_scan_text(raw_text)?;
        let validation = self.api.validate_qr_code(text).await?;

        if !validation.success {
            return Err(ResolveError::rejected(
                validation.message,
                "QR code could not be validated",
            ));
        }

        if validation.user_exists {
            let user = validation.user.ok_or_else(|| ResolveError::Malformed {
                message: "user reported as existing but not included".to_string(),
            })?;

            let already_entered_today = if validation.already_entered {
                log::info!("{} has already entered today", user.full_name);
                true
            } else {
                self.record_member_entry(user.user_id, &user.full_name).await?
            };

            return Ok(CheckInOutcome::KnownUser {
                user_id: user.user_id,
                full_name: user.full_name,
                user_type: user.user_type,
                already_entered_today,
            });
        }

        if validation.is_day_pass {
            let suggested_name = tagged_visitor_name(text)
                .or_else(|| {
                    validation
                        .name
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                })
                .unwrap_or_default();
            log::debug!("Day pass code for '{}'", suggested_name);
            return Ok(CheckInOutcome::DayPassCandidate { suggested_name });
        }

        log::debug!("Unrecognized code '{}'", text);
        Ok(CheckInOutcome::Unrecognized)
    }

    /// Record a one-time visitor entry
    pub async fn create_day_pass_entry(&self, visitor_name: &str) -> ResolveResult<()> {
        let name = validate_visitor_name(visitor_name)?;
        let response = self
            .api
            .add_entry_log(&EntryLogRequest::day_pass(name.as_str(), self.operator.id))
            .await?;

        if !response.success {
            return Err(ResolveError::rejected(
                response.message,
                "Could not record day pass",
            ));
        }
        log::info!("Day pass recorded for {}", name);
        Ok(())
    }

    /// Record an entry for a user picked from manual search
    pub async fn check_in_user(&self, user: &UserMatch) -> ResolveResult<CheckInOutcome> {
        let already_entered_today = self.record_member_entry(user.id, &user.full_name).await?;
        Ok(CheckInOutcome::KnownUser {
            user_id: user.id,
            full_name: user.full_name.clone(),
            user_type: user.user_type,
            already_entered_today,
        })
    }

    /// Look users up by partial name; short queries never reach the server
    pub async fn search_by_name(&self, partial: &str) -> ResolveResult<UserMatches> {
        let query = partial.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(UserMatches::empty());
        }

        let response = self.api.search_users(query).await?;
        if !response.success {
            return Err(ResolveError::rejected(response.message, "Search failed"));
        }
        log::debug!("Search '{}' matched {} user(s)", query, response.users.len());
        Ok(UserMatches::from(response.users))
    }

    /// Most recent entry logs, newest first as served
    pub async fn recent_logs(&self) -> ResolveResult<Vec<LogEntry>> {
        let response = self.api.fetch_logs().await?;
        if !response.success {
            return Err(ResolveError::rejected(response.message, "Could not load logs"));
        }
        Ok(response.logs)
    }

    // Returns whether the server already had an entry for today
    async fn record_member_entry(&self, user_id: u64, full_name: &str) -> ResolveResult<bool> {
        let response = self
            .api
            .add_entry_log(&EntryLogRequest::member(user_id, self.operator.id))
            .await?;

        if response.already_entered {
            log::info!("{} has already entered today", full_name);
            return Ok(true);
        }
        if !response.success {
            return Err(ResolveError::rejected(
                response.message,
                "Could not record entry",
            ));
        }
        log::info!("{} has entered the gym", full_name);
        Ok(false)
    }
}
