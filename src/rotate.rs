//! Active-log rotation at quota-epoch boundaries.
//!
//! The active log must only ever hold records from a single contiguous
//! quota epoch. When the observed quota-reset marker changes, the active
//! file is renamed to a dated archive and a fresh active file starts on
//! the next append.

use crate::paths;
use crate::schedule::format_date_key;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel epoch marker meaning "no quota-reset value was observed".
pub const NO_RESET_KEY: &str = "no-reset";

/// Picks the calendar-day stamp for an archive file.
///
/// The archive is labeled with the epoch that just ended: the previous
/// marker's calendar day when it parses as a timestamp, falling back to
/// the day of `now` when the marker was the sentinel or unparseable.
pub fn archive_date_stamp(prev_quota_key: &str, now: DateTime<Utc>) -> String {
    if prev_quota_key != NO_RESET_KEY {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(prev_quota_key) {
            return format_date_key(parsed.with_timezone(&Utc));
        }
        // The endpoint has returned bare dates for quota_reset_date_utc.
        if let Ok(date) = NaiveDate::parse_from_str(prev_quota_key, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    format_date_key(now)
}

/// Archives the active log when the quota epoch changed.
///
/// Returns the archive path when a rotation happened, `None` when the
/// markers are equal or there is no active file to rotate (first runs).
/// An existing archive with the same stamp is overwritten: the last
/// rotation on a given calendar day wins.
pub fn archive_active_log_if_needed(
    dir: &Path,
    prev_quota_key: &str,
    current_quota_key: &str,
    now: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    if prev_quota_key == current_quota_key {
        return Ok(None);
    }

    let active = paths::active_log_path(dir);
    if !active.exists() {
        return Ok(None);
    }

    let archive = paths::archive_log_path(dir, &archive_date_stamp(prev_quota_key, now));

    // Atomic rename first; fall back to copy-then-delete when the rename
    // is unsupported, accepting a brief window where both files coexist.
    if fs::rename(&active, &archive).is_err() {
        fs::copy(&active, &archive).with_context(|| {
            format!("Failed to copy active log to archive: {}", archive.display())
        })?;
        fs::remove_file(&active)
            .with_context(|| format!("Failed to remove active log: {}", active.display()))?;
    }

    Ok(Some(archive))
}

#[cfg(test)]
#[path = "tests/rotate_tests.rs"]
mod tests;
