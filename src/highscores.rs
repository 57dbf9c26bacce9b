//! Best score persistence
//!
//! The best score is a single integer keyed by name. A [`ScoreStore`] keeps
//! it durable; [`BestScoreCell`] caches it and writes through on change.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::consts::BEST_SCORE_KEY;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Durable key/value storage for integer scores
pub trait ScoreStore {
    /// Read a value (None if never written)
    fn load(&self, key: &str) -> Result<Option<u64>, StoreError>;
    /// Write a value
    fn save(&mut self, key: &str, value: u64) -> Result<(), StoreError>;
}

/// In-memory store (tests, or when persistence is unavailable)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.values.get(key).copied())
    }

    fn save(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON map on disk; survives process restarts
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ScoreStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn save(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StoreError::Parse(e)) => {
                log::warn!("Overwriting corrupt score store {}: {e}", self.path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value);
        // Write to a sibling temp file first so a crash never leaves half a file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Read/write cell over a [`ScoreStore`] entry
pub struct BestScoreCell {
    store: Box<dyn ScoreStore>,
    key: String,
    value: u64,
}

impl BestScoreCell {
    /// Open the default best-score entry; unreadable stores start at zero
    pub fn open(store: Box<dyn ScoreStore>) -> Self {
        Self::open_key(store, BEST_SCORE_KEY)
    }

    pub fn open_key(store: Box<dyn ScoreStore>, key: &str) -> Self {
        let value = match store.load(key) {
            Ok(Some(value)) => {
                log::info!("Loaded best score {value}");
                value
            }
            Ok(None) => {
                log::info!("No best score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("Could not read best score: {e}");
                0
            }
        };
        Self {
            store,
            key: key.to_string(),
            value,
        }
    }

    /// Cached value
    pub fn get(&self) -> u64 {
        self.value
    }

    /// Update the cached value and persist it
    pub fn set(&mut self, value: u64) -> Result<(), StoreError> {
        if value == self.value {
            return Ok(());
        }
        self.value = value;
        self.store.save(&self.key, value)
    }
}

impl std::fmt::Debug for BestScoreCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BestScoreCell")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
