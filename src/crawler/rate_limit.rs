//! Rate-limit telemetry
//!
//! The listing reports its request quota on every response:
//! - `x-ratelimit-remaining`: requests left in the window (sometimes sent as a float, e.g. `"3.0"`)
//! - `x-ratelimit-reset`: seconds until the window resets
//!
//! A pause scheduled from this telemetry is not an error; it is the controller
//! being polite before the next fetch.

use reqwest::header::HeaderMap;
use std::time::Duration;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Quota information parsed from a response
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateLimitTelemetry {
    /// Requests left in the current window
    pub remaining: Option<f64>,

    /// Seconds until the window resets
    pub reset_seconds: Option<u64>,
}

impl RateLimitTelemetry {
    /// Parses telemetry headers; absent or unparseable values become `None`
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let remaining = header_number(headers, REMAINING_HEADER);
        let reset_seconds = header_number(headers, RESET_HEADER)
            .filter(|secs| *secs >= 0.0)
            .map(|secs| secs.ceil() as u64);

        Self {
            remaining,
            reset_seconds,
        }
    }

    /// How long to pause before the next fetch, if at all
    ///
    /// # Arguments
    ///
    /// * `floor` - pause when fewer than this many requests remain
    /// * `fallback` - pause used when the quota is low but no reset delay was reported
    pub fn required_wait(&self, floor: u32, fallback: Duration) -> Option<Duration> {
        let remaining = self.remaining?;
        if remaining >= f64::from(floor) {
            return None;
        }

        Some(
            self.reset_seconds
                .map(Duration::from_secs)
                .unwrap_or(fallback),
        )
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<f64> {
    let raw = headers.get(name)?.to_str().ok()?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::debug!("Ignoring unparseable {} header: {:?}", name, raw);
            None
        }
    }
}
