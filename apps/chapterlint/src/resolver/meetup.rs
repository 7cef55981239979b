//! Meetup group client.

use super::throttle::{self, Sleeper};
use super::{build_client, HttpConfig, MeetupGroup, MeetupLookup, MeetupOutcome, ResolveError};
use reqwest::blocking::Client;

pub const DEFAULT_API: &str = "https://api.meetup.com";
const FIELDS: &str = "past_event_count,upcoming_event_count";

/// Map a group response to a meetup outcome.
pub fn meetup_outcome(status: u16, body: &str) -> Result<MeetupOutcome, ResolveError> {
    match status {
        404 => Ok(MeetupOutcome::Missing),
        410 => Ok(MeetupOutcome::Gone),
        _ => serde_json::from_str::<MeetupGroup>(body)
            .map(MeetupOutcome::Group)
            .map_err(|e| ResolveError::Decode {
                status,
                reason: e.to_string(),
            }),
    }
}

pub struct MeetupClient {
    http: Client,
    api: String,
    sleep: Sleeper,
}

impl MeetupClient {
    pub fn new(config: &HttpConfig, api: &str) -> Result<Self, ResolveError> {
        Ok(Self {
            http: build_client(config)?,
            api: api.trim_end_matches('/').to_string(),
            sleep: throttle::thread_sleep,
        })
    }

    pub fn with_sleeper(mut self, sleep: Sleeper) -> Self {
        self.sleep = sleep;
        self
    }
}

impl MeetupLookup for MeetupClient {
    fn group(&self, slug: &str) -> Result<MeetupOutcome, ResolveError> {
        let url = format!("{}/{}", self.api, slug);
        tracing::debug!("Making GET request to: {}", url);
        let response = self.http.get(&url).query(&[("fields", FIELDS)]).send()?;
        tracing::debug!("GET response: {} {}", response.status(), url);

        let headers = response.headers();
        let wait = throttle::meetup_wait(
            throttle::header_u64(headers, throttle::REMAINING),
            throttle::header_u64(headers, throttle::RESET),
        );
        if let Some(wait) = wait {
            tracing::warn!(
                seconds = wait.as_secs(),
                "Meetup rate limit nearly exhausted; sleeping"
            );
            (self.sleep)(wait);
        }

        let status = response.status().as_u16();
        let body = response.text()?;
        meetup_outcome(status, &body)
    }
}
