use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::weather::WeatherSnapshot;

/// Key holding the last serialized snapshot.
pub const WEATHER_RESPONSE_KEY: &str = "weather_response_data";

/// App-scoped string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write-then-rename so readers never see a half-written value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-process store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Holds exactly one snapshot, the most recent successful fetch.
#[derive(Debug)]
pub struct WeatherCache<S> {
    store: S,
}

impl<S: KeyValueStore> WeatherCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serializes `snapshot` and overwrites the slot.
    pub fn save(&self, snapshot: &WeatherSnapshot) -> Result<(), CacheError> {
        let text = serde_json::to_string(snapshot)?;
        self.store.put(WEATHER_RESPONSE_KEY, &text)?;
        debug!("Cached weather snapshot for {}", snapshot.location_name);
        Ok(())
    }

    /// Reads the slot, distinguishing an empty slot from an unreadable one.
    pub fn try_load(&self) -> Result<Option<WeatherSnapshot>, CacheError> {
        match self.store.get(WEATHER_RESPONSE_KEY)? {
            Some(text) if !text.trim().is_empty() => Ok(Some(serde_json::from_str(&text)?)),
            _ => Ok(None),
        }
    }

    /// Reads the slot. Unreadable or outdated data counts as absent.
    pub fn load(&self) -> Option<WeatherSnapshot> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring cached weather: {}", e);
                None
            }
        }
    }
}
