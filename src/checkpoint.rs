//! Persisted "remaining work" for interrupted submission runs.
//!
//! The checkpoint is a single JSON value under a fixed key: an ordered array of
//! `{"account_id": ..., "amount": "<base units>"}` records. A finished or never
//! started run is stored as `[]`, not as a missing key.

use crate::error::{Error, Result};
use crate::types::TransferEntry;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key the pending recipients are stored under.
pub const CHECKPOINT_KEY: &str = "accounts";

pub trait CheckpointStore: Send + Sync {
    fn save(&self, entries: &[TransferEntry]) -> Result<()>;

    /// Pending entries; empty when nothing was ever saved.
    fn load(&self) -> Result<Vec<TransferEntry>>;

    fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}

/// Checkpoint kept as `<dir>/<key>.json`, next to the user settings by default.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(format!("{CHECKPOINT_KEY}.json")),
        }
    }

    /// Store in the per-user application data directory.
    pub fn in_app_data_dir() -> Self {
        Self::new(crate::operation_log::app_data_dir())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&self, entries: &[TransferEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(entries)?;
        // Write-then-rename so a crash never leaves a torn checkpoint behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!("Checkpoint saved: {} pending entries", entries.len());
        Ok(())
    }

    fn load(&self) -> Result<Vec<TransferEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::Checkpoint(format!("{} is not a valid checkpoint: {e}", self.path.display()))
        })
    }
}

/// Checkpoint held in memory only.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    value: Mutex<Option<String>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw serialized value, `None` if nothing was ever saved.
    pub fn raw(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, entries: &[TransferEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        let mut value = self
            .value
            .lock()
            .map_err(|_| Error::Checkpoint("checkpoint lock poisoned".to_string()))?;
        *value = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Vec<TransferEntry>> {
        let value = self
            .value
            .lock()
            .map_err(|_| Error::Checkpoint("checkpoint lock poisoned".to_string()))?;
        match value.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }
}
