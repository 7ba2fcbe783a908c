//! Persistence layer
//!
//! `Storage` keeps the whole map state as a single JSON blob under one fixed
//! key of a `KeyValueStore`, the way a browser page keeps it in local storage.

use crate::error::MapError;
use anyhow::{Context, Result, anyhow};
use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A synchronous key-value store whose operations may fail
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, `None` if there is none
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Persistence adapter for the serialized marker list
pub struct Storage {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl Storage {
    pub fn new(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored blob
    ///
    /// Returns `None` when nothing is stored or the store fails; a failure is
    /// logged and not propagated.
    pub fn load(&self) -> Option<String> {
        self.try_load().unwrap_or_else(|e| {
            warn!("{}", e);
            None
        })
    }

    /// Read the stored blob, keeping a store failure apart from an empty store
    pub fn try_load(&self) -> Result<Option<String>, MapError> {
        self.store
            .get_item(&self.key)
            .map_err(|e| MapError::StorageRead(format!("{:#}", e)))
    }

    /// Write the blob
    ///
    /// On failure a warning is logged and the previously stored blob is left
    /// as it was.
    pub fn save(&mut self, serialized_records: &str) -> Result<(), MapError> {
        self.store
            .set_item(&self.key, serialized_records)
            .map_err(|e| {
                let err = MapError::StorageWrite(format!("{:#}", e));
                warn!("{}", err);
                err
            })
    }
}

/// File-backed store: a JSON object mapping keys to values
pub struct FileStore {
    file_path: PathBuf,
}

impl FileStore {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Sibling path used while writing; never equal to the store file itself
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>> {
        if !self.file_path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let items = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.file_path.display()))?;
        Ok(items)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        // Refuse to overwrite a file we could not parse; other keys would be lost
        let mut items = self.read_items()?;
        items.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&items)?;

        // Write beside the target and rename so a failed write keeps the old file
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.file_path)
            .with_context(|| format!("Failed to replace {}", self.file_path.display()))?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    fail_writes: bool,
}

/// In-memory store
///
/// Clones share the same contents, so a caller can keep a handle after
/// moving a clone into a `Storage`. Writes can be made to fail to simulate a
/// full store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `set_item` fail (quota exceeded) until reset
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        if inner.fail_writes {
            return Err(anyhow!("quota exceeded"));
        }
        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
