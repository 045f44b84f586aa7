//! Persisted key/value settings.
//!
//! The engine never touches global state: everything it persists (model,
//! credential, instruction overrides, default platform) goes through a
//! [`ConfigStore`] handed to it at construction. A missing key always means
//! "use the compiled default".

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

/// Store key for the access credential.
pub const API_KEY_KEY: &str = "openai_api_key";
/// Store key for the active model identifier.
pub const MODEL_KEY: &str = "openai_model";
/// Store key for the preferred platform.
pub const DEFAULT_PLATFORM_KEY: &str = "default_platform";

/// Failure to read or write the persisted store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not read settings from {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Settings file {path} is malformed: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Could not write settings to {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// A flat string-to-string settings store.
pub trait ConfigStore: Send + Sync {
    /// Read a value. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read a key, treating an unreadable store as an empty one.
pub fn get_or_warn(store: &dyn ConfigStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|v| !v.trim().is_empty()),
        Err(e) => {
            tracing::warn!(key, error = %e, "Settings unreadable, using defaults");
            None
        }
    }
}

/// In-memory store, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `pairs`.
    pub fn with_values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { values: RwLock::new(values) }
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Store backed by a flat TOML table on disk.
///
/// The file is re-read on every access so edits made by another process are
/// picked up; writes are serialized through a lock.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Store at `<config_dir>/writer-pro/settings.toml`.
    pub fn default_location() -> Option<Self> {
        super::Config::config_dir().map(|dir| Self::new(dir.join("settings.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StoreError::Read { path: self.path.clone(), source }),
        };

        toml::from_str(&content)
            .map_err(|e| StoreError::Parse { path: self.path.clone(), message: e.to_string() })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let write_err =
            |message: String| StoreError::Write { path: self.path.clone(), message };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let content = toml::to_string_pretty(values).map_err(|e| write_err(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| write_err(e.to_string()))
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
