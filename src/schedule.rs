//! Run-eligibility helpers: calendar-day keys and the focus cooldown.

use chrono::{DateTime, Utc};

/// Minimum spacing between focus-triggered runs.
pub const FOCUS_THROTTLE_MS: i64 = 60 * 60 * 1000;

/// Formats a timestamp as a `YYYY-MM-DD` calendar-day key, always in UTC.
///
/// The key de-duplicates startup runs (at most one append per day) and
/// names archives at rotation time.
pub fn format_date_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Returns true when enough time has passed since the last focus run.
///
/// The boundary is inclusive: exactly `throttle_ms` elapsed is allowed.
/// A `last_run_ms` of 0 means "never ran".
pub fn should_run_on_focus(last_run_ms: i64, now_ms: i64, throttle_ms: i64) -> bool {
    now_ms - last_run_ms >= throttle_ms
}
