//! Daily quota recording orchestration.
//!
//! One invocation per host trigger: decide eligibility, fetch the remote
//! account state, build a log record, rotate the active log when the quota
//! epoch changed, append, and persist the run markers. A failed invocation
//! never leaves run state partially updated: markers are written only after
//! a successful append.

use crate::api_client::AccountStatusClient;
use crate::credentials::SessionProvider;
use crate::error::RecorderError;
use crate::paths;
use crate::rotate::{self, NO_RESET_KEY};
use crate::schedule;
use crate::store::StateStore;
use crate::types::{extract_premium_quota, DailyLogEntry};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Day key of the last startup/manual run.
pub const LAST_RUN_KEY: &str = "copilotTelemetry.lastRunDate";
/// Epoch millis of the last focus-triggered run.
pub const LAST_FOCUS_RUN_TS_KEY: &str = "copilotTelemetry.lastFocusRunTs";
/// Quota-reset marker active when the active log was last written.
pub const CURRENT_QUOTA_RESET_KEY: &str = "copilotTelemetry.currentQuotaReset";
/// Operator override for the fetched quota-reset marker.
pub const FORCE_RESET_ENV: &str = "COPILOT_TELEMETRY_FORCE_RESET";

/// Host lifecycle event behind an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Trigger {
    Startup,
    Manual,
    Focus,
}

/// Why an invocation ended without recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A startup run already appended a record today.
    AlreadyRanToday,
    /// The focus cooldown window has not elapsed yet.
    FocusThrottled,
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Recorded {
        log_path: PathBuf,
        archived: Option<PathBuf>,
    },
    Skipped(SkipReason),
}

/// Orchestrator owning the run-state store and the external collaborators.
pub struct DailyRecorder<S, P, C> {
    store: S,
    session: P,
    client: C,
    log_directory: Option<String>,
}

impl<S, P, C> DailyRecorder<S, P, C>
where
    S: StateStore,
    P: SessionProvider,
    C: AccountStatusClient,
{
    /// `log_directory` is the raw configured value; empty/`~` resolution
    /// happens per run.
    pub fn new(store: S, session: P, client: C, log_directory: Option<String>) -> Self {
        Self {
            store,
            session,
            client,
            log_directory,
        }
    }

    /// Runs one recording cycle at the current time.
    pub fn run(&mut self, trigger: Trigger) -> Result<RunOutcome, RecorderError> {
        self.run_at(trigger, Utc::now())
    }

    /// Runs one recording cycle with a pinned clock.
    pub fn run_at(
        &mut self,
        trigger: Trigger,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome, RecorderError> {
        let today_key = schedule::format_date_key(now);

        match trigger {
            Trigger::Startup => {
                if self.store.get(LAST_RUN_KEY).as_deref() == Some(today_key.as_str()) {
                    tracing::debug!("already recorded on {}, skipping startup run", today_key);
                    return Ok(RunOutcome::Skipped(SkipReason::AlreadyRanToday));
                }
            }
            Trigger::Focus => {
                let last_ms = self
                    .store
                    .get(LAST_FOCUS_RUN_TS_KEY)
                    .and_then(|value| value.parse::<i64>().ok())
                    .unwrap_or(0);
                if !schedule::should_run_on_focus(
                    last_ms,
                    now.timestamp_millis(),
                    schedule::FOCUS_THROTTLE_MS,
                ) {
                    return Ok(RunOutcome::Skipped(SkipReason::FocusThrottled));
                }
            }
            Trigger::Manual => {}
        }

        let token = self.session.access_token()?;
        let mut data = self.client.fetch_user_data(&token)?;

        if let Some(forced) = forced_quota_reset() {
            data.quota_reset_date_utc = Some(forced);
        }

        let quota = extract_premium_quota(&data);
        let entry = DailyLogEntry::new(&today_key, now, quota, data.quota_reset_date_utc.as_deref());

        let dir = paths::resolve_log_directory(self.log_directory.as_deref())
            .map_err(RecorderError::filesystem)?;

        let current_quota_key = entry
            .quota_reset_date_utc
            .clone()
            .unwrap_or_else(|| NO_RESET_KEY.to_string());
        let prev_quota_key = self
            .store
            .get(CURRENT_QUOTA_RESET_KEY)
            .unwrap_or_else(|| NO_RESET_KEY.to_string());

        let archived =
            rotate::archive_active_log_if_needed(&dir, &prev_quota_key, &current_quota_key, now)
                .map_err(RecorderError::filesystem)?;
        if let Some(path) = &archived {
            tracing::info!(
                "quota epoch changed, archived active log to {}",
                path.display()
            );
        }

        let log_path = paths::active_log_path(&dir);
        append_entry(&log_path, &entry).map_err(RecorderError::filesystem)?;

        match trigger {
            Trigger::Startup | Trigger::Manual => {
                self.store
                    .set(LAST_RUN_KEY, &today_key)
                    .map_err(RecorderError::filesystem)?;
            }
            Trigger::Focus => {
                self.store
                    .set(LAST_FOCUS_RUN_TS_KEY, &now.timestamp_millis().to_string())
                    .map_err(RecorderError::filesystem)?;
            }
        }
        self.store
            .set(CURRENT_QUOTA_RESET_KEY, &current_quota_key)
            .map_err(RecorderError::filesystem)?;

        Ok(RunOutcome::Recorded { log_path, archived })
    }
}

/// Reads the operator override for the quota-reset marker; blank values
/// count as absent.
fn forced_quota_reset() -> Option<String> {
    std::env::var(FORCE_RESET_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn append_entry(path: &Path, entry: &DailyLogEntry) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(entry).context("Failed to serialize log entry")?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open active log: {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("Failed to append to active log: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/recorder_tests.rs"]
mod tests;
