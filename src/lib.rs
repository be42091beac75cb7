//! Daily GitHub Copilot quota telemetry recorder.
//!
//! On host lifecycle triggers (startup, window focus, manual invocation)
//! this crate fetches a quota snapshot from the Copilot account-status
//! endpoint, derives a daily usage record, and appends it to an append-only
//! JSONL log on local disk, archiving the log whenever the observed
//! quota-reset epoch changes.

pub mod api_client;
pub mod credentials;
pub mod error;
pub mod paths;
pub mod recorder;
pub mod rotate;
pub mod schedule;
pub mod store;
pub mod types;
