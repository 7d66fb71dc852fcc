//! Best-streak persistence.
//!
//! DESIGN
//! ======
//! The game only ever stores one scalar, but the collaborator is modeled as a
//! small key-value store so the backing can be swapped: a JSON object file for
//! the terminal game, an in-memory map for tests. Writes are whole-file
//! replacements of the JSON map: serialize to a sibling `.tmp` file, then
//! rename it over the original, so a crash mid-write leaves the old file.
//!
//! A save over an unparseable file logs a warning and starts from an empty
//! map; other keys in that file are lost.
//!
//! The file I/O is blocking. It runs inline on the session task, and only
//! when the best streak improves, on a file of a few bytes.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

/// Key under which the best streak is stored.
pub const BEST_STREAK_KEY: &str = "bestStreak";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scalar key-value persistence used for the best streak.
pub trait ScoreStore: Send {
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<u32>, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&mut self, key: &str, value: u32) -> Result<(), StoreError>;
}

// =============================================================================
// JSON FILE
// =============================================================================

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_map(&self) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<u32>, StoreError> {
        let map = self.read_map()?;
        Ok(map
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok()))
    }

    fn save(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StoreError::Json(e)) => {
                warn!(error = %e, path = %self.path.display(), "score file unreadable; rewriting it");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), serde_json::json!(value));
        let raw = serde_json::to_string_pretty(&map)?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process store. Clones share the same map, so a test can keep a handle
/// after moving the store into an engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, u32>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(key: &str, value: u32) -> Self {
        let store = Self::new();
        store.lock().insert(key.to_string(), value);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u32>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.lock().get(key).copied())
    }

    fn save(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
