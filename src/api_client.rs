//! HTTP client for the Copilot account-status endpoint.

use crate::error::RecorderError;
use crate::types::CopilotUserData;
use std::time::Duration;

const API_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Copilot-Telemetry-Logger";
const COPILOT_USER_URL: &str = "https://api.github.com/copilot_internal/user";

/// Fetches the remote account state for one recording cycle.
pub trait AccountStatusClient {
    fn fetch_user_data(&self, access_token: &str) -> Result<CopilotUserData, RecorderError>;
}

/// Client for the `copilot_internal/user` endpoint.
pub struct CopilotApiClient;

impl AccountStatusClient for CopilotApiClient {
    fn fetch_user_data(&self, access_token: &str) -> Result<CopilotUserData, RecorderError> {
        fetch_copilot_user_data(access_token)
    }
}

/// Single-attempt GET against the account-status endpoint.
///
/// Non-success statuses are reported with their numeric code and status
/// text. There is no retry here; the next trigger is the retry mechanism.
pub fn fetch_copilot_user_data(access_token: &str) -> Result<CopilotUserData, RecorderError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(API_TIMEOUT))
        .http_status_as_error(false)
        .build()
        .into();

    let mut response = agent
        .get(COPILOT_USER_URL)
        .header("Authorization", &format!("Bearer {}", access_token))
        .header("Accept", "application/json")
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|err| RecorderError::remote(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RecorderError::remote_status(
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status"),
        ));
    }

    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|err| RecorderError::remote(format!("failed to read response body: {}", err)))?;

    serde_json::from_str(&body)
        .map_err(|err| RecorderError::remote(format!("failed to parse response body: {}", err)))
}
