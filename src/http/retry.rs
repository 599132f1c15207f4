//! Rate-limit handling and response classification.

use std::time::{Duration, SystemTime};

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};

/// Default number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Wait used when a 429 carries no usable `Retry-After` (absent, zero, past or garbled).
pub const RETRY_DELAY_MS: u64 = 1000;

/// How the executor must treat a response it has fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Hand the envelope to the caller (2xx, or 404 which callers interpret themselves).
    Return,
    /// Wait and send again if the budget allows.
    RateLimited,
    Unauthorized,
    Upstream,
}

pub fn classify_status(status: StatusCode) -> Outcome {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
        StatusCode::UNAUTHORIZED => Outcome::Unauthorized,
        StatusCode::NOT_FOUND => Outcome::Return,
        s if s.is_success() => Outcome::Return,
        _ => Outcome::Upstream,
    }
}

/// Accepts `application/json` and structured `+json` types, ignoring parameters.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Reads `Retry-After` as delta-seconds or an HTTP-date relative to `now`.
pub fn parse_retry_after(headers: &HeaderMap, now: SystemTime) -> Option<Duration> {
    let raw_value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = raw_value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = httpdate::parse_http_date(raw_value).ok()?;
    Some(date.duration_since(now).unwrap_or(Duration::ZERO))
}

/// How long to wait before the next attempt after a 429.
pub fn rate_limit_delay(headers: &HeaderMap, now: SystemTime) -> Duration {
    match parse_retry_after(headers, now) {
        Some(delay) if !delay.is_zero() => delay,
        // Some servers report zero (or nothing) while still limiting.
        _ => Duration::from_millis(RETRY_DELAY_MS),
    }
}
