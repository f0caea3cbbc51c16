//! Persistent key/value storage for preferences and the transcript.
//!
//! Every value is a string; callers own their encoding (JSON lists, plain
//! words, stringified integers). Each mutation rewrites the whole backing
//! file so a crash never leaves a half-written store behind.

use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::warn;

use crate::core::config::data::path_display;

pub const KEY_CHAT_HISTORY: &str = "chat_history";
pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_THEME: &str = "theme";
pub const KEY_FONT_SIZE: &str = "font_size";

const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug)]
pub enum StorageError {
    /// The backing file could not be written or its directory created.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The in-memory map could not be encoded.
    Encode(serde_json::Error),

    /// The temporary file could not be moved over the store.
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Write { path, source } => {
                write!(f, "Failed to write storage at {}: {}", path_display(path), source)
            }
            StorageError::Encode(source) => write!(f, "Failed to encode storage: {source}"),
            StorageError::Persist { path, source } => {
                write!(f, "Failed to replace storage at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StorageError::Write { source, .. } => Some(source),
            StorageError::Encode(source) => Some(source),
            StorageError::Persist { source, .. } => Some(source),
        }
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

fn lock_entries<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// JSON-file backed store living in the platform data directory.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is logged and treated as empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path_display(&path), error = %err, "ignoring malformed storage file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path_display(&path), error = %err, "storage file unreadable");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Store location inside `data_dir`, or the platform data directory.
    pub fn resolve_path(data_dir: Option<&Path>) -> Result<PathBuf, Box<dyn StdError>> {
        if let Some(dir) = data_dir {
            return Ok(dir.join(STORAGE_FILE_NAME));
        }
        let proj_dirs = ProjectDirs::from("org", "hikmat", "hikmat")
            .ok_or("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().join(STORAGE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(entries).map_err(StorageError::Encode)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file.write_all(contents.as_bytes()).map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|source| StorageError::Persist {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock_entries(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock_entries(&self.entries);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}

/// Volatile store, used by tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock_entries(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock_entries(&self.entries).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_across_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join(STORAGE_FILE_NAME);

        let store = FileStore::open(path.clone());
        assert_eq!(store.get(KEY_THEME), None);
        store.set(KEY_THEME, "light").expect("set theme");
        store.set(KEY_FONT_SIZE, "18").expect("set font size");

        let reopened = FileStore::open(path);
        assert_eq!(reopened.get(KEY_THEME).as_deref(), Some("light"));
        assert_eq!(reopened.get(KEY_FONT_SIZE).as_deref(), Some("18"));
    }

    #[test]
    fn file_store_remove_is_persisted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(STORAGE_FILE_NAME);

        let store = FileStore::open(path.clone());
        store.set(KEY_CHAT_HISTORY, "[]").unwrap();
        store.remove(KEY_CHAT_HISTORY).unwrap();
        store.remove("never-set").unwrap();

        assert_eq!(FileStore::open(path).get(KEY_CHAT_HISTORY), None);
    }

    #[test]
    fn malformed_file_opens_as_empty_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(STORAGE_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(path.clone());
        assert_eq!(store.get(KEY_THEME), None);

        store.set(KEY_THEME, "dark").unwrap();
        assert_eq!(FileStore::open(path).get(KEY_THEME).as_deref(), Some("dark"));
    }

    #[test]
    fn resolve_path_honors_explicit_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = FileStore::resolve_path(Some(temp_dir.path())).unwrap();
        assert_eq!(path, temp_dir.path().join(STORAGE_FILE_NAME));
    }

    #[test]
    fn memory_store_seeds_entries() {
        let store = MemoryStore::with_entries([(KEY_THEME, "light")]);
        assert_eq!(store.get(KEY_THEME).as_deref(), Some("light"));
        store.remove(KEY_THEME).unwrap();
        assert_eq!(store.get(KEY_THEME), None);
    }
}
