//! GitHub credential lookup for the account-status fetch.
//!
//! The session collaborator: a bearer token resolved from the environment
//! first (`GITHUB_TOKEN`, then `GH_TOKEN`), then from the `gh` CLI hosts
//! file. Interactive sign-in is left to `gh auth login`.

use crate::error::RecorderError;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const GH_TOKEN_ENV: &str = "GH_TOKEN";
const GH_CONFIG_DIR_ENV: &str = "GH_CONFIG_DIR";

/// Supplies the bearer credential for the account-status endpoint.
pub trait SessionProvider {
    fn access_token(&self) -> Result<String, RecorderError>;
}

/// Token discovery against the ambient GitHub CLI installation.
pub struct GhSessionProvider;

impl SessionProvider for GhSessionProvider {
    fn access_token(&self) -> Result<String, RecorderError> {
        match read_github_token() {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(RecorderError::AuthenticationUnavailable(
                "no GitHub token found; set GITHUB_TOKEN or run `gh auth login`".to_string(),
            )),
            Err(err) => Err(RecorderError::AuthenticationUnavailable(format!(
                "{:#}",
                err
            ))),
        }
    }
}

fn read_github_token() -> Result<Option<String>> {
    for var in [GITHUB_TOKEN_ENV, GH_TOKEN_ENV] {
        if let Ok(value) = std::env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
    read_gh_cli_token()
}

/// Reads the oauth token `gh auth login` stores in hosts.yml.
fn read_gh_cli_token() -> Result<Option<String>> {
    let hosts_path = gh_hosts_path()?;
    if !hosts_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&hosts_path).context("Failed to read gh hosts file")?;
    let hosts: serde_yaml::Value =
        serde_yaml::from_str(&content).context("Failed to parse gh hosts file")?;

    Ok(hosts["github.com"]["oauth_token"]
        .as_str()
        .map(String::from))
}

fn gh_hosts_path() -> Result<PathBuf> {
    let config_dir = std::env::var(GH_CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config").join("gh")))
        .context("Cannot determine gh config directory")?;
    Ok(config_dir.join("hosts.yml"))
}
