//! Durable key/value storage for the cart, the customer profile and the
//! order completion marker.
//!
//! Every slot is written whole. Readers treat anything they cannot parse as
//! an absent slot; see [`slot`].

pub mod slot;

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on slot {key}: {source}")]
    Io { key: String, #[source] source: std::io::Error },

    #[error("Failed to encode slot {key}: {source}")]
    Encode { key: String, #[source] source: serde_json::Error },

    #[error("Invalid slot key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub type SharedStorage = Arc<dyn Storage>;

/// Slot names under one namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotKeys { namespace: String }

impl SlotKeys {
    pub fn new(namespace: impl Into<String>) -> Self { Self { namespace: namespace.into() } }
    pub fn cart(&self) -> String { format!("{}_cart", self.namespace) }
    pub fn customer(&self) -> String { format!("{}_customer", self.namespace) }
    pub fn order_completed(&self) -> String { format!("{}_order_completed", self.namespace) }
}

#[derive(Debug, Default)]
pub struct MemoryStorage { slots: Mutex<HashMap<String, String>> }

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
    pub fn shared() -> Arc<Self> { Arc::new(Self::new()) }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().map_err(|_| StorageError::Poisoned)?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.lock().map_err(|_| StorageError::Poisoned)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.lock().map_err(|_| StorageError::Poisoned)?.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per slot inside a directory.
///
/// Writes land in a temporary file in the same directory that is then
/// persisted over the slot. A failed write leaves the old content and no
/// stray file behind.
#[derive(Debug, Clone)]
pub struct FileStorage { dir: PathBuf }

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) && !key.starts_with('.');
        if !valid { return Err(StorageError::InvalidKey(key.to_string())); }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io = |source| StorageError::Io { key: key.to_string(), source };
        std::fs::create_dir_all(&self.dir).map_err(io)?;
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io)?;
        temp.write_all(value.as_bytes()).map_err(io)?;
        temp.as_file().sync_all().map_err(io)?;
        temp.persist(&path).map_err(|e| io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(StorageError::Io { key: key.to_string(), source: e }),
            _ => Ok(()),
        }
    }
}
