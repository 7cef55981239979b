//! External status resolution for GitHub Pages and Meetup groups.
//!
//! Clients turn HTTP responses into small outcome enums; the `apply_*`
//! functions fold an outcome (or a transport failure) into the current
//! chapter's status and emit the matching finding. A failed lookup is
//! recorded as `ServiceStatus::Failed` for that chapter only, and the audit
//! moves on.

pub mod github;
pub mod meetup;
pub mod throttle;

pub use github::GithubClient;
pub use meetup::MeetupClient;

use crate::checks::CheckContext;
use crate::models::{ServiceStatus, Severity};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Past meetings below this count are a policy violation.
pub const MIN_PAST_EVENTS: u64 = 3;

/// HTTP client configuration shared by both resolvers.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("chapterlint/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a configured blocking HTTP client.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::blocking::Client, ResolveError> {
    reqwest::blocking::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(ResolveError::ClientBuild)
}

/// Resolver errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response (status {status}): {reason}")]
    Decode { status: u16, reason: String },
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResolveError::Timeout
        } else {
            ResolveError::Request(e)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the hosting platform says about a chapter repository.
pub enum PagesOutcome {
    Missing,
    Gone,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Fields consumed from the Meetup group endpoint.
pub struct MeetupGroup {
    pub status: String,
    #[serde(default)]
    pub past_event_count: u64,
    #[serde(default)]
    pub upcoming_event_count: u64,
    #[serde(default)]
    pub members: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetupOutcome {
    Missing,
    Gone,
    Group(MeetupGroup),
}

/// Pages-hosting lookup by repository name.
pub trait PagesLookup {
    fn pages(&self, repo: &str) -> Result<PagesOutcome, ResolveError>;
}

/// Meetup lookup by group slug.
pub trait MeetupLookup {
    fn group(&self, slug: &str) -> Result<MeetupOutcome, ResolveError>;
}

/// Fold a pages lookup into the chapter status.
pub fn apply_pages(
    result: Result<PagesOutcome, ResolveError>,
    path: &Path,
    ctx: &mut CheckContext<'_>,
) {
    const RULE: &str = "pages";
    let (status, severity, message) = match result {
        Ok(PagesOutcome::Missing) => (
            ServiceStatus::Nonexistent,
            Severity::PolicyViolation,
            "GitHub repository does not exist".to_string(),
        ),
        Ok(PagesOutcome::Gone) => (
            ServiceStatus::Inactive,
            Severity::PolicyViolation,
            "GitHub repository is gone".to_string(),
        ),
        Ok(PagesOutcome::Enabled) => (
            ServiceStatus::Active,
            Severity::Info,
            "GitHub Pages enabled".to_string(),
        ),
        Ok(PagesOutcome::Disabled) => (
            ServiceStatus::Inactive,
            Severity::PolicyViolation,
            "GitHub Pages disabled".to_string(),
        ),
        Err(e) => (
            ServiceStatus::Failed,
            Severity::High,
            format!("GitHub Pages lookup failed: {}", e),
        ),
    };
    ctx.status.pages_status = status;
    ctx.report(RULE, severity, path, None, message);
}

/// Fold a meetup lookup for `slug` into the chapter status.
pub fn apply_meetup(
    slug: &str,
    result: Result<MeetupOutcome, ResolveError>,
    path: &Path,
    line: Option<usize>,
    ctx: &mut CheckContext<'_>,
) {
    const RULE: &str = "meetup";
    match result {
        Ok(MeetupOutcome::Missing) => {
            ctx.status.meetup_status = ServiceStatus::Nonexistent;
            ctx.report(
                RULE,
                Severity::PolicyViolation,
                path,
                line,
                format!("Meetup group '{}' does not exist", slug),
            );
        }
        Ok(MeetupOutcome::Gone) => {
            ctx.status.meetup_status = ServiceStatus::Inactive;
            ctx.report(
                RULE,
                Severity::PolicyViolation,
                path,
                line,
                format!("Meetup group '{}' is gone", slug),
            );
        }
        Ok(MeetupOutcome::Group(g)) if g.status == "active" => {
            ctx.status.meetup_status = ServiceStatus::Active;
            ctx.status.meetup_group = slug.to_string();
            ctx.status.meetup_past_events = g.past_event_count;
            ctx.status.meetup_upcoming_events = g.upcoming_event_count;
            ctx.status.meetup_members = g.members;
            if g.past_event_count < MIN_PAST_EVENTS {
                ctx.report(
                    RULE,
                    Severity::PolicyViolation,
                    path,
                    line,
                    format!(
                        "Meetup group '{}' has only {} past meetings ({} upcoming)",
                        slug, g.past_event_count, g.upcoming_event_count
                    ),
                );
            } else {
                ctx.report(
                    RULE,
                    Severity::Info,
                    path,
                    line,
                    format!(
                        "Meetup group '{}' active: {} past, {} upcoming, {} members",
                        slug, g.past_event_count, g.upcoming_event_count, g.members
                    ),
                );
            }
        }
        Ok(MeetupOutcome::Group(g)) => {
            tracing::warn!(
                chapter = ctx.chapter,
                group = slug,
                status = %g.status,
                "unrecognized meetup group status"
            );
        }
        Err(e) => {
            ctx.status.meetup_status = ServiceStatus::Failed;
            ctx.report(
                RULE,
                Severity::High,
                path,
                line,
                format!("Meetup lookup for '{}' failed: {}", slug, e),
            );
        }
    }
}
