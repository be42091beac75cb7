//! Data types for Copilot quota telemetry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of the quota category this tool records.
pub const PREMIUM_QUOTA_ID: &str = "premium_interactions";

/// Source tag stamped into every log entry.
pub const ENTRY_SOURCE: &str = "github_copilot_internal";

/// Log entry schema version.
pub const ENTRY_VERSION: u32 = 1;

/// One quota category's state at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    pub quota_id: String,
    pub timestamp_utc: Option<String>,
    pub entitlement: Option<f64>,
    pub remaining: Option<f64>,
    pub unlimited: Option<bool>,
}

/// Account-status payload from the `copilot_internal/user` endpoint.
///
/// Only the fields consumed here are modeled; everything else in the
/// response is ignored. A missing snapshot map means "no snapshots".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopilotUserData {
    pub quota_snapshots: Option<HashMap<String, QuotaSnapshot>>,
    pub quota_reset_date_utc: Option<String>,
}

/// Selects the premium-interactions snapshot out of the fetched collection.
///
/// Unlimited quotas are treated as absent: they have no meaningful
/// entitlement/remaining pair and must be recorded as all-null rather than
/// misleading zeros.
pub fn extract_premium_quota(data: &CopilotUserData) -> Option<&QuotaSnapshot> {
    let snapshots = data.quota_snapshots.as_ref()?;
    let premium = snapshots
        .values()
        .find(|quota| quota.quota_id == PREMIUM_QUOTA_ID)?;
    if premium.unlimited.unwrap_or(false) {
        return None;
    }
    Some(premium)
}

/// The persisted unit: one line of the daily usage log.
///
/// Immutable once constructed; nulls are serialized explicitly so every
/// line carries the full field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    pub date: String,
    pub timestamp: String,
    pub premium_entitlement: Option<f64>,
    pub premium_remaining: Option<f64>,
    pub premium_used: Option<f64>,
    pub quota_reset_date_utc: Option<String>,
    pub source: String,
    pub version: u32,
}

impl DailyLogEntry {
    /// Builds the entry for one recording cycle.
    ///
    /// `premium_used` is `max(0, entitlement - remaining)` when both sides
    /// are present and null otherwise; it is never negative.
    pub fn new(
        date_key: &str,
        now: DateTime<Utc>,
        quota: Option<&QuotaSnapshot>,
        quota_reset: Option<&str>,
    ) -> Self {
        let entitlement = quota.and_then(|q| q.entitlement);
        let remaining = quota.and_then(|q| q.remaining);
        let used = match (entitlement, remaining) {
            (Some(entitlement), Some(remaining)) => Some((entitlement - remaining).max(0.0)),
            _ => None,
        };

        Self {
            date: date_key.to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            premium_entitlement: entitlement,
            premium_remaining: remaining,
            premium_used: used,
            quota_reset_date_utc: quota_reset.map(String::from),
            source: ENTRY_SOURCE.to_string(),
            version: ENTRY_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(quota_id: &str, unlimited: bool) -> QuotaSnapshot {
        QuotaSnapshot {
            quota_id: quota_id.to_string(),
            timestamp_utc: None,
            entitlement: Some(300.0),
            remaining: Some(120.0),
            unlimited: Some(unlimited),
        }
    }

    fn data_with(snapshots: Vec<QuotaSnapshot>) -> CopilotUserData {
        let map = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.quota_id.clone(), snapshot))
            .collect();
        CopilotUserData {
            quota_snapshots: Some(map),
            quota_reset_date_utc: None,
        }
    }

    #[test]
    fn extract_finds_premium_among_other_snapshots() {
        let data = data_with(vec![
            snapshot("chat", true),
            snapshot(PREMIUM_QUOTA_ID, false),
            snapshot("completions", true),
        ]);
        let premium = extract_premium_quota(&data).expect("premium snapshot present");
        assert_eq!(premium.quota_id, PREMIUM_QUOTA_ID);
    }

    #[test]
    fn extract_returns_none_when_premium_absent() {
        let data = data_with(vec![snapshot("chat", false)]);
        assert!(extract_premium_quota(&data).is_none());
    }

    #[test]
    fn extract_treats_unlimited_as_absent() {
        let data = data_with(vec![snapshot(PREMIUM_QUOTA_ID, true)]);
        assert!(extract_premium_quota(&data).is_none());
    }

    #[test]
    fn extract_tolerates_missing_collection() {
        assert!(extract_premium_quota(&CopilotUserData::default()).is_none());
    }

    #[test]
    fn used_is_entitlement_minus_remaining() {
        let quota = QuotaSnapshot {
            quota_id: PREMIUM_QUOTA_ID.to_string(),
            timestamp_utc: None,
            entitlement: Some(10.0),
            remaining: Some(3.0),
            unlimited: Some(false),
        };
        let now = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let entry = DailyLogEntry::new("2026-02-13", now, Some(&quota), None);
        assert_eq!(entry.premium_used, Some(7.0));
    }

    #[test]
    fn used_is_clamped_to_zero_when_remaining_exceeds_entitlement() {
        let quota = QuotaSnapshot {
            quota_id: PREMIUM_QUOTA_ID.to_string(),
            timestamp_utc: None,
            entitlement: Some(3.0),
            remaining: Some(10.0),
            unlimited: Some(false),
        };
        let now = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let entry = DailyLogEntry::new("2026-02-13", now, Some(&quota), None);
        assert_eq!(entry.premium_used, Some(0.0));
    }

    #[test]
    fn used_is_null_unless_both_sides_present() {
        let quota = QuotaSnapshot {
            quota_id: PREMIUM_QUOTA_ID.to_string(),
            timestamp_utc: None,
            entitlement: Some(10.0),
            remaining: None,
            unlimited: Some(false),
        };
        let now = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let entry = DailyLogEntry::new("2026-02-13", now, Some(&quota), None);
        assert_eq!(entry.premium_used, None);

        let entry = DailyLogEntry::new("2026-02-13", now, None, None);
        assert_eq!(entry.premium_entitlement, None);
        assert_eq!(entry.premium_remaining, None);
        assert_eq!(entry.premium_used, None);
    }

    #[test]
    fn entry_timestamp_is_utc_with_milliseconds() {
        let now = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let entry = DailyLogEntry::new("2026-02-13", now, None, None);
        assert_eq!(entry.timestamp, "2026-02-13T10:00:00.000Z");
    }

    #[test]
    fn entry_serializes_nulls_explicitly() {
        let now = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let entry = DailyLogEntry::new("2026-02-13", now, None, None);
        let line = serde_json::to_string(&entry).unwrap();
        assert!(line.contains("\"premium_entitlement\":null"));
        assert!(line.contains("\"premium_used\":null"));
        assert!(line.contains("\"quota_reset_date_utc\":null"));
        assert!(line.contains("\"source\":\"github_copilot_internal\""));
        assert!(line.contains("\"version\":1"));
    }

    #[test]
    fn endpoint_payload_deserializes_with_unknown_fields() {
        let json = r#"{
            "access_type_sku": "copilot_pro",
            "chat_enabled": true,
            "quota_snapshots": {
                "chat": { "quota_id": "chat", "unlimited": true },
                "premium_interactions": {
                    "quota_id": "premium_interactions",
                    "timestamp_utc": "2026-02-13T08:00:00Z",
                    "entitlement": 300,
                    "remaining": 294.5,
                    "unlimited": false
                }
            },
            "quota_reset_date_utc": "2026-03-01"
        }"#;
        let data: CopilotUserData = serde_json::from_str(json).unwrap();
        let premium = extract_premium_quota(&data).expect("premium snapshot present");
        assert_eq!(premium.entitlement, Some(300.0));
        assert_eq!(premium.remaining, Some(294.5));
        assert_eq!(data.quota_reset_date_utc.as_deref(), Some("2026-03-01"));
    }
}
