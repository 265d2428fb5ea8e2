//! Time helpers. All timestamps on the wire are unix seconds.

use chrono::{DateTime, Utc};

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Current time in unix seconds.
pub fn unix_now() -> i64 {
    now().timestamp()
}

/// Resolve a provider freshness marker, treating absent or zero as "now".
pub fn freshness_or_now(marker: Option<i64>) -> i64 {
    match marker {
        Some(ts) if ts > 0 => ts,
        _ => unix_now(),
    }
}
