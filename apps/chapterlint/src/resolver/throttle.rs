//! Rate-limit budget handling from `X-RateLimit-*` response headers.
//!
//! Both services report the remaining request budget in
//! `X-RateLimit-Remaining`. They differ in `X-RateLimit-Reset`: GitHub sends
//! an absolute epoch second, Meetup sends seconds until the reset. Waiting
//! is a blocking sleep on the calling thread, so the whole audit pauses.

use reqwest::header::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const REMAINING: &str = "x-ratelimit-remaining";
pub const RESET: &str = "x-ratelimit-reset";

/// Blocking pause used by the clients; swapped out in tests.
pub type Sleeper = fn(Duration);

pub fn thread_sleep(d: Duration) {
    std::thread::sleep(d);
}

pub fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// GitHub: when the budget is spent, wait until the reset epoch.
pub fn github_wait(remaining: Option<u64>, reset_epoch: Option<u64>, now: u64) -> Option<Duration> {
    if remaining != Some(0) {
        return None;
    }
    let reset = reset_epoch?;
    // one extra second so the first request after waking lands in the new window
    Some(Duration::from_secs(reset.saturating_sub(now) + 1))
}

/// Meetup: when down to the last request, wait the stated reset interval.
pub fn meetup_wait(remaining: Option<u64>, reset_secs: Option<u64>) -> Option<Duration> {
    match remaining {
        Some(r) if r <= 1 => Some(Duration::from_secs(reset_secs.unwrap_or(0))),
        _ => None,
    }
}
