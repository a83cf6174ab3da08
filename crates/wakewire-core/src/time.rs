//! Unix timestamp helpers.
//!
//! Relay rows use seconds (liveness windows and retention are
//! second-granular); command payloads carry milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as seconds since the Unix epoch.
#[allow(clippy::cast_possible_wrap)]
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Current time as milliseconds since the Unix epoch.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn unix_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn millis_and_seconds_agree() {
        let secs = unix_timestamp();
        let millis = unix_timestamp_millis();
        let diff = (millis / 1000 - secs).abs();
        assert!(diff <= 1, "seconds and milliseconds drifted: {diff}");
    }
}
