//! Filesystem locations for telemetry logs and recorder state.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed name of the currently-appended log file.
pub const ACTIVE_LOG_FILE: &str = "copilot-telemetry.jsonl";

/// Stem shared by the active log and its dated archives.
pub const LOG_FILE_PREFIX: &str = "copilot-telemetry";

/// Overrides the configured log directory when set.
pub const LOG_DIR_ENV: &str = "COPILOT_TELEMETRY_LOG_DIR";

/// Relocates the recorder state directory (defaults to `~/.copilot-telemetry`).
pub const HOME_ENV: &str = "COPILOT_TELEMETRY_HOME";

const STATE_DIR_NAME: &str = ".copilot-telemetry";
const STATE_FILE: &str = "state.json";

/// Resolves the configured log directory and creates it, parents included.
///
/// Empty or unset means the user's home directory; a leading `~` is joined
/// onto the home directory; anything else is used verbatim.
pub fn resolve_log_directory(configured: Option<&str>) -> Result<PathBuf> {
    let trimmed = configured.unwrap_or("").trim();

    let dir = if trimmed.is_empty() {
        home_dir()?
    } else if let Some(rest) = trimmed.strip_prefix('~') {
        home_dir()?.join(rest.trim_start_matches(['/', '\\']))
    } else {
        PathBuf::from(trimmed)
    };

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the active log path inside a resolved directory.
pub fn active_log_path(dir: &Path) -> PathBuf {
    dir.join(ACTIVE_LOG_FILE)
}

/// Returns the archive path for a given calendar-day stamp.
pub fn archive_log_path(dir: &Path, date_stamp: &str) -> PathBuf {
    dir.join(format!("{}-{}.jsonl", LOG_FILE_PREFIX, date_stamp))
}

/// Returns the run-state file path: `~/.copilot-telemetry/state.json`.
///
/// Creates the state directory if it doesn't exist. `COPILOT_TELEMETRY_HOME`
/// relocates the directory for tests and sandboxed installs.
pub fn state_path() -> Result<PathBuf> {
    let dir = match std::env::var(HOME_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => home_dir()?.join(STATE_DIR_NAME),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
    Ok(dir.join(STATE_FILE))
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Could not determine home directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    struct HomeGuard {
        original: Option<String>,
    }

    impl HomeGuard {
        fn set(path: &Path) -> Self {
            let original = std::env::var("HOME").ok();
            std::env::set_var("HOME", path);
            Self { original }
        }
    }

    impl Drop for HomeGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(value) => std::env::set_var("HOME", value),
                None => std::env::remove_var("HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn empty_config_resolves_to_home() {
        let home = TempDir::new().unwrap();
        let _guard = HomeGuard::set(home.path());
        assert_eq!(resolve_log_directory(None).unwrap(), home.path());
        assert_eq!(resolve_log_directory(Some("   ")).unwrap(), home.path());
    }

    #[test]
    #[serial]
    fn tilde_prefix_expands_against_home() {
        let home = TempDir::new().unwrap();
        let _guard = HomeGuard::set(home.path());
        let dir = resolve_log_directory(Some("~/copilot/logs")).unwrap();
        assert_eq!(dir, home.path().join("copilot").join("logs"));
        assert!(dir.is_dir());
    }

    #[test]
    #[serial]
    fn bare_tilde_resolves_to_home() {
        let home = TempDir::new().unwrap();
        let _guard = HomeGuard::set(home.path());
        assert_eq!(resolve_log_directory(Some("~")).unwrap(), home.path());
    }

    #[test]
    fn explicit_path_is_used_verbatim_and_created() {
        let target = TempDir::new().unwrap();
        let nested = target.path().join("telemetry").join("logs");
        let dir = resolve_log_directory(Some(nested.to_str().unwrap())).unwrap();
        assert_eq!(dir, nested);
        assert!(dir.is_dir());
    }

    #[test]
    fn archive_name_embeds_date_stamp() {
        let dir = Path::new("/var/log/copilot");
        assert_eq!(
            archive_log_path(dir, "2026-02-14"),
            PathBuf::from("/var/log/copilot/copilot-telemetry-2026-02-14.jsonl")
        );
    }

    #[test]
    #[serial]
    fn state_path_honors_home_override() {
        let custom = TempDir::new().unwrap();
        std::env::set_var(HOME_ENV, custom.path());
        let path = state_path().unwrap();
        std::env::remove_var(HOME_ENV);
        assert_eq!(path, custom.path().join("state.json"));
    }
}
