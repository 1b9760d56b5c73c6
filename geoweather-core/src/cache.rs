//! Last-response cache on top of a small string key-value store.

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::model::WeatherSnapshot;

/// Key the serialized snapshot is stored under.
pub const WEATHER_RESPONSE_KEY: &str = "weather_response_data";

/// Convenience cache of the most recent successful response.
pub trait ResponseCache: Send + Sync + Debug {
    /// Overwrites any previous value. Persistence errors are logged, never returned.
    fn save(&self, snapshot: &WeatherSnapshot);

    /// `None` if nothing was saved or the stored value does not parse.
    fn load(&self) -> Option<WeatherSnapshot>;
}

pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct KeyValueCache<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValueCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> ResponseCache for KeyValueCache<S> {
    fn save(&self, snapshot: &WeatherSnapshot) {
        let result = serde_json::to_string(snapshot)
            .context("Failed to serialize weather snapshot")
            .and_then(|json| self.store.put(WEATHER_RESPONSE_KEY, &json));

        if let Err(err) = result {
            tracing::warn!(error = %format!("{err:#}"), "could not cache weather response");
        }
    }

    fn load(&self) -> Option<WeatherSnapshot> {
        let raw = match self.store.get(WEATHER_RESPONSE_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(err) => {
                tracing::warn!(
                    error = %format!("{err:#}"),
                    "could not read cached weather response"
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::debug!(%err, "ignoring malformed cached weather response");
                None
            }
        }
    }
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as one JSON object file. Reads and writes are serialized.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&entries).context("Failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write store file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;

        Ok(())
    }
}
