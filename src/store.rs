//! Persisted run state, modeled as a string key-value store.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::paths;

/// Key-value interface for the recorder's persisted markers.
///
/// Loaded lazily per invocation and written after each successful append;
/// no explicit init or teardown.
pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Run state persisted as a JSON map on disk.
pub struct FileStateStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStateStore {
    /// Opens the store at the default state path.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::state_path()?)
    }

    /// Opens the store at an explicit path, loading existing values.
    pub fn open(path: PathBuf) -> Result<Self> {
        let values = if path.exists() {
            let content = fs::read_to_string(&path).context("Failed to read recorder state")?;
            serde_json::from_str(&content).context("Failed to parse recorder state")?
        } else {
            HashMap::new()
        };
        Ok(Self { path, values })
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.values)
            .context("Failed to serialize recorder state")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write recorder state: {}", self.path.display()))?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// In-memory store for hosts that keep run state themselves, and for tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: HashMap<String, String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
