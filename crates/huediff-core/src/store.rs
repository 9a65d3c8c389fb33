//! Durable keyed state

use crate::mode::Mode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const INPUT1_KEY: &str = "textDiff_input1";
pub const INPUT2_KEY: &str = "textDiff_input2";
pub const OUTPUT_KEY: &str = "textDiff_output";
pub const MODE_KEY: &str = "mode";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// A durable key-value facility holding raw string values
pub trait Storage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Storage that lives as long as the value does
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object file, rewritten on every change
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the file at `path`; a missing file is an empty store
    ///
    /// Unreadable contents never fail the open. Entries that are not strings
    /// are dropped, and a file that is not a JSON object starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => parse_entries(&path, &contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened state file");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temporary file, then rename over the original
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents =
            serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Serialize {
                key: self.path.display().to_string(),
                source,
            })?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn parse_entries(path: &Path, contents: &str) -> BTreeMap<String, String> {
    let object = match serde_json::from_str::<serde_json::Value>(contents) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "state file is not an object, starting empty");
            return BTreeMap::new();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "state file unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(raw) => Some((key, raw)),
            _ => {
                tracing::warn!(path = %path.display(), %key, "skipping non-string state entry");
                None
            }
        })
        .collect()
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Typed access to a [`Storage`], values encoded as JSON
#[derive(Debug, Default)]
pub struct StateStore<S> {
    storage: S,
}

impl<S: Storage> StateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read `key`, or `default` if it is missing or holds an incompatible value
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.storage.load(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(key, error = %err, "stored value incompatible, using default");
                default
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.storage.save(key, &raw)
    }

    pub fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage.remove(key)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// Everything the comparison page keeps between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub input1: String,
    pub input2: String,
    pub mode: Mode,
    pub output: String,
}

impl PersistedState {
    pub fn load<S: Storage>(store: &StateStore<S>) -> Self {
        Self {
            input1: store.get(INPUT1_KEY, String::new()),
            input2: store.get(INPUT2_KEY, String::new()),
            mode: store.get(MODE_KEY, Mode::default()),
            output: store.get(OUTPUT_KEY, String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_returns_default_when_missing() {
        let store = StateStore::new(MemoryStorage::new());
        assert_eq!(store.get(INPUT1_KEY, "fallback".to_string()), "fallback");
    }

    #[test]
    fn test_set_get_clear() {
        let mut store = StateStore::new(MemoryStorage::new());
        store.set(MODE_KEY, &Mode::Lines).unwrap();
        assert_eq!(store.get(MODE_KEY, Mode::Text), Mode::Lines);

        store.clear(MODE_KEY).unwrap();
        assert_eq!(store.get(MODE_KEY, Mode::Text), Mode::Text);
    }

    #[test]
    fn test_incompatible_value_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.save(INPUT1_KEY, "{\"not\": \"a string\"}").unwrap();
        storage.save(INPUT2_KEY, "not json at all").unwrap();
        let store = StateStore::new(storage);

        assert_eq!(store.get(INPUT1_KEY, String::new()), "");
        assert_eq!(store.get(INPUT2_KEY, String::new()), "");
    }

    #[test]
    fn test_unknown_stored_mode_resolves_to_text() {
        let mut storage = MemoryStorage::new();
        storage.save(MODE_KEY, "\"array\"").unwrap();
        let store = StateStore::new(storage);
        assert_eq!(store.get(MODE_KEY, Mode::Json), Mode::Text);
    }

    #[test]
    fn test_values_are_json_encoded() {
        let mut store = StateStore::new(MemoryStorage::new());
        store.set(INPUT1_KEY, "a\"b").unwrap();
        assert_eq!(
            store.storage().load(INPUT1_KEY).as_deref(),
            Some("\"a\\\"b\"")
        );
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = StateStore::new(FileStorage::open(&path).unwrap());
        store.set(INPUT1_KEY, "left").unwrap();
        store.set(MODE_KEY, &Mode::Sentences).unwrap();
        drop(store);

        let mut reopened = StateStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(reopened.get(INPUT1_KEY, String::new()), "left");
        assert_eq!(reopened.get(MODE_KEY, Mode::Text), Mode::Sentences);

        reopened.clear(INPUT1_KEY).unwrap();
        let again = StateStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(again.get(INPUT1_KEY, String::new()), "");
        assert_eq!(again.get(MODE_KEY, Mode::Text), Mode::Sentences);
    }

    #[test]
    fn test_non_string_entry_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"textDiff_input1": "\"left\"", "mode": 3}"#).unwrap();

        let store = StateStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(store.storage().load(MODE_KEY), None);
        assert_eq!(
            PersistedState::load(&store),
            PersistedState {
                input1: "left".to_string(),
                ..PersistedState::default()
            }
        );
    }

    #[test]
    fn test_corrupt_state_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let mut store = StateStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(PersistedState::load(&store), PersistedState::default());

        store.set(INPUT2_KEY, "right").unwrap();
        let reopened = StateStore::new(FileStorage::open(&path).unwrap());
        assert_eq!(reopened.get(INPUT2_KEY, String::new()), "right");
    }

    #[test]
    fn test_non_object_state_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[\"a\", \"b\"]").unwrap();

        let store = FileStorage::open(&path).unwrap();
        assert_eq!(store.load(INPUT1_KEY), None);
    }

    #[test]
    fn test_persisted_state_load() {
        let mut store = StateStore::new(MemoryStorage::new());
        store.set(INPUT2_KEY, "right").unwrap();
        store.set(MODE_KEY, &Mode::Css).unwrap();

        assert_eq!(
            PersistedState::load(&store),
            PersistedState {
                input2: "right".to_string(),
                mode: Mode::Css,
                ..PersistedState::default()
            }
        );
    }
}
