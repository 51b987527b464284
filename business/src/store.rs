//! Local key-value persistence.
//!
//! Everything durable lives under three keys: [`StoreKey::Theme`], [`StoreKey::History`] and
//! [`StoreKey::Favorites`]. Values are strings; entry lists are JSON arrays. Reading never
//! fails outward: a missing or malformed record falls back to its default and is logged.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{history::HistoryEntry, shell::ThemeState};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize storage record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Storage is not writable")]
    ReadOnly,
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// The records the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Theme,
    History,
    Favorites,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::History => "history",
            Self::Favorites => "favorites",
        }
    }
}

/// Trait for string key-value backends, enabling an in-memory store for testing.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
    read_only: bool,
}

impl MemoryStore {
    /// Seeds the store with existing records.
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
            ),
            read_only: false,
        }
    }

    /// A store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            values: Mutex::default(),
            read_only: true,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_e| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let mut values = self.values.lock().map_err(|_e| StorageError::Poisoned)?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let mut values = self.values.lock().map_err(|_e| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// JSON object of string values in a single file.
///
/// The file is read once on open and rewritten on every change (temp file then rename).
/// Another process writing the same file concurrently wins or loses as a whole.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; an unreadable or
    /// malformed one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed storage file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Failed to read storage file {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// `storage.json` in the platform data directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "qrkit", "qr-studio").map_or_else(
            || PathBuf::from("storage.json"),
            |dirs| dirs.data_dir().join("storage.json"),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(values)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_e| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_e| StorageError::Poisoned)?;
        values.insert(key.to_owned(), value.to_owned());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_e| StorageError::Poisoned)?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

/// Typed access to the application's records.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by memory only, for tests and previews.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    fn read(&self, key: StoreKey) -> Option<String> {
        match self.backend.get(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {:?} from storage: {e}", key.as_str());
                None
            }
        }
    }

    pub fn load_theme(&self) -> ThemeState {
        match self.read(StoreKey::Theme).as_deref() {
            None => ThemeState::default(),
            Some(raw) => ThemeState::from_stored(raw).unwrap_or_else(|| {
                log::warn!("Ignoring unknown stored theme {raw:?}");
                ThemeState::default()
            }),
        }
    }

    pub fn save_theme(&self, theme: ThemeState) -> Result<(), StorageError> {
        self.backend.set(StoreKey::Theme.as_str(), theme.as_stored())
    }

    /// Reads an entry list. Absent or malformed records read as empty.
    pub fn load_entries(&self, key: StoreKey) -> Vec<HistoryEntry> {
        let Some(raw) = self.read(key) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {:?} record: {e}", key.as_str());
            Vec::new()
        })
    }

    pub fn save_entries(&self, key: StoreKey, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        self.backend.set(key.as_str(), &raw)
    }

    pub fn remove(&self, key: StoreKey) -> Result<(), StorageError> {
        self.backend.remove(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("qrkit-store-{}-{name}", std::process::id()))
            .join("storage.json")
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::default();
        store.set("theme", "light").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn read_only_store_rejects_writes() {
        let store = MemoryStore::read_only();

        assert!(matches!(store.set("a", "b"), Err(StorageError::ReadOnly)));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        FileStore::open(&path).set("theme", "light").unwrap();
        let reopened = FileStore::open(&path);

        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("light"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_treats_malformed_file_as_empty() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);

        assert_eq!(store.get("history").unwrap(), None);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn malformed_records_fall_back_to_defaults() {
        let store = PersistentStore::new(Arc::new(MemoryStore::with_values([
            ("theme", "sepia"),
            ("history", "[{\"id\": \"nope\"}]"),
            ("favorites", "not json"),
        ])));

        assert_eq!(store.load_theme(), ThemeState::Dark);
        assert!(store.load_entries(StoreKey::History).is_empty());
        assert!(store.load_entries(StoreKey::Favorites).is_empty());
    }

    #[test]
    fn theme_round_trips_through_store() {
        let store = PersistentStore::in_memory();
        assert_eq!(store.load_theme(), ThemeState::Dark);

        store.save_theme(ThemeState::Light).unwrap();
        assert_eq!(store.load_theme(), ThemeState::Light);
    }
}
