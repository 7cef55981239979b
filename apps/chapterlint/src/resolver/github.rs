//! GitHub repository metadata client (pages-hosting status).

use super::throttle::{self, Sleeper};
use super::{build_client, HttpConfig, PagesLookup, PagesOutcome, ResolveError};
use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde::Deserialize;

pub const DEFAULT_API: &str = "https://api.github.com";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

#[derive(Deserialize)]
struct RepoMeta {
    has_pages: bool,
}

/// Map a repository-metadata response to a pages outcome.
///
/// 404 and 410 are decided by status alone; anything else must carry a
/// `has_pages` boolean.
pub fn pages_outcome(status: u16, body: &str) -> Result<PagesOutcome, ResolveError> {
    match status {
        404 => Ok(PagesOutcome::Missing),
        410 => Ok(PagesOutcome::Gone),
        _ => {
            let meta: RepoMeta =
                serde_json::from_str(body).map_err(|e| ResolveError::Decode {
                    status,
                    reason: e.to_string(),
                })?;
            Ok(if meta.has_pages {
                PagesOutcome::Enabled
            } else {
                PagesOutcome::Disabled
            })
        }
    }
}

pub struct GithubClient {
    http: Client,
    api: String,
    org: String,
    token: Option<String>,
    sleep: Sleeper,
}

impl GithubClient {
    pub fn new(
        config: &HttpConfig,
        api: &str,
        org: &str,
        token: Option<String>,
    ) -> Result<Self, ResolveError> {
        Ok(Self {
            http: build_client(config)?,
            api: api.trim_end_matches('/').to_string(),
            org: org.to_string(),
            token: token.filter(|t| !t.is_empty()),
            sleep: throttle::thread_sleep,
        })
    }

    pub fn with_sleeper(mut self, sleep: Sleeper) -> Self {
        self.sleep = sleep;
        self
    }

    fn fetch(&self, url: &str) -> Result<Response, ResolveError> {
        let mut req = self.http.get(url).header(ACCEPT, ACCEPT_V3);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        tracing::debug!("Making GET request to: {}", url);
        let response = req.send()?;
        tracing::debug!("GET response: {} {}", response.status(), url);
        Ok(response)
    }
}

impl PagesLookup for GithubClient {
    fn pages(&self, repo: &str) -> Result<PagesOutcome, ResolveError> {
        let url = format!("{}/repos/{}/{}", self.api, self.org, repo);
        let mut response = self.fetch(&url)?;

        let headers = response.headers();
        let wait = throttle::github_wait(
            throttle::header_u64(headers, throttle::REMAINING),
            throttle::header_u64(headers, throttle::RESET),
            throttle::now_epoch(),
        );
        if let Some(wait) = wait {
            tracing::warn!(
                seconds = wait.as_secs(),
                "GitHub rate limit exhausted; sleeping until reset"
            );
            (self.sleep)(wait);
            // the throttled response carries no repository data; ask again
            if matches!(response.status().as_u16(), 403 | 429) {
                response = self.fetch(&url)?;
            }
        }

        let status = response.status().as_u16();
        let body = response.text()?;
        pages_outcome(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn no_sleep(_: Duration) {}

    fn client(url: &str, token: Option<&str>) -> GithubClient {
        GithubClient::new(
            &HttpConfig::default(),
            url,
            "OWASP",
            token.map(String::from),
        )
        .unwrap()
        .with_sleeper(no_sleep)
    }

    #[test]
    fn test_pages_outcome_by_status() {
        assert_eq!(pages_outcome(404, "garbage").unwrap(), PagesOutcome::Missing);
        assert_eq!(
            pages_outcome(404, r#"{"has_pages": true}"#).unwrap(),
            PagesOutcome::Missing
        );
        assert_eq!(pages_outcome(410, "").unwrap(), PagesOutcome::Gone);
        assert_eq!(
            pages_outcome(200, r#"{"name":"x","has_pages":true}"#).unwrap(),
            PagesOutcome::Enabled
        );
        assert_eq!(
            pages_outcome(200, r#"{"has_pages":false}"#).unwrap(),
            PagesOutcome::Disabled
        );
        assert!(matches!(
            pages_outcome(500, "oops"),
            Err(ResolveError::Decode { status: 500, .. })
        ));
    }

    #[test]
    fn test_pages_request_shape() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/repos/OWASP/www-chapter-london")
            .match_header("authorization", "Bearer secret")
            .match_header("accept", ACCEPT_V3)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-ratelimit-remaining", "4999")
            .with_body(r#"{"has_pages": true}"#)
            .create();

        let gh = client(&server.url(), Some("secret"));
        assert_eq!(gh.pages("www-chapter-london").unwrap(), PagesOutcome::Enabled);
        mock.assert();
    }

    #[test]
    fn test_pages_not_found() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/repos/OWASP/www-chapter-nowhere")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create();
        let gh = client(&server.url(), None);
        assert_eq!(gh.pages("www-chapter-nowhere").unwrap(), PagesOutcome::Missing);
    }

    static SLEPT_SECS: AtomicU64 = AtomicU64::new(u64::MAX);

    fn record_sleep(d: Duration) {
        SLEPT_SECS.store(d.as_secs(), Ordering::SeqCst);
    }

    #[test]
    fn test_exhausted_budget_sleeps_before_returning() {
        let mut server = mockito::Server::new();
        let reset = throttle::now_epoch() + 30;
        let _m = server
            .mock("GET", "/repos/OWASP/www-chapter-paris")
            .with_status(200)
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", &reset.to_string())
            .with_body(r#"{"has_pages": false}"#)
            .create();
        let gh = client(&server.url(), None).with_sleeper(record_sleep);
        assert_eq!(gh.pages("www-chapter-paris").unwrap(), PagesOutcome::Disabled);
        let slept = SLEPT_SECS.load(Ordering::SeqCst);
        assert!((1..=31).contains(&slept), "slept {}", slept);
    }

    #[test]
    fn test_throttled_response_is_fetched_again() {
        let mut server = mockito::Server::new();
        let reset = throttle::now_epoch() + 5;
        let throttled = server
            .mock("GET", "/repos/OWASP/www-chapter-rome")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", &reset.to_string())
            .with_body(r#"{"message":"API rate limit exceeded"}"#)
            .expect(1)
            .create();
        let fresh = server
            .mock("GET", "/repos/OWASP/www-chapter-rome")
            .with_status(200)
            .with_header("x-ratelimit-remaining", "4999")
            .with_body(r#"{"has_pages": true}"#)
            .expect(1)
            .create();
        let gh = client(&server.url(), None);
        assert_eq!(gh.pages("www-chapter-rome").unwrap(), PagesOutcome::Enabled);
        throttled.assert();
        fresh.assert();
    }

    #[test]
    fn test_transport_failure_is_an_error() {
        // nothing listens on this port
        let gh = client("http://127.0.0.1:9", None);
        assert!(gh.pages("www-chapter-x").is_err());
    }
}
