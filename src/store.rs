//! Settings store access
//!
//! The settings store is a flat key-value database of scalars owned by the
//! platform. Values are kept as text; integer reads parse on the fly and fall
//! back to the caller's default. Writes report success as a bool and are
//! never retried.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key-value settings provider
pub trait SettingsStore {
    /// Raw value of `key`, `None` when unset
    fn get_string(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`; `None` deletes it
    fn put_string(&mut self, key: &str, value: Option<&str>) -> bool;

    /// Integer value of `key`, `default` when unset or not an integer
    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.get_string(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> bool {
        self.put_string(key, Some(&value.to_string()))
    }

    fn contains(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }

    fn remove(&mut self, key: &str) -> bool {
        self.put_string(key, None)
    }

    /// Pick up changes made by other writers
    fn reload(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Volatile store, used for private prefs without a backing file and in tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `(key, value)` pairs
    pub fn from_pairs<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(pairs: I) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put_string(&mut self, key: &str, value: Option<&str>) -> bool {
        match value {
            Some(v) => {
                self.values.insert(key.to_string(), v.to_string());
            }
            None => {
                self.values.remove(key);
            }
        }
        true
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Store persisted as a flat JSON object
///
/// Every put re-reads the file, applies the change and rewrites it atomically.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = Self::read_values(&path)?;

        tracing::debug!(path = %path.display(), entries = values.len(), "Settings store opened");

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(path).map_err(StoreError::IoError)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(StoreError::ParseError)
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(StoreError::IoError)?;

        let contents = serde_json::to_string_pretty(values).map_err(StoreError::ParseError)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(StoreError::IoError)?;
        tmp.write_all(contents.as_bytes()).map_err(StoreError::IoError)?;
        tmp.persist(&self.path).map_err(|e| StoreError::IoError(e.error))?;

        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put_string(&mut self, key: &str, value: Option<&str>) -> bool {
        // Start from disk so keys written by other processes survive
        let mut values = match Self::read_values(&self.path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(key, error = %e, path = %self.path.display(), "Settings re-read failed, using cached values");
                self.values.clone()
            }
        };

        // Unchanged values skip the rewrite so watchers see no event
        if values.get(key).map(String::as_str) == value {
            self.values = values;
            return true;
        }

        match value {
            Some(v) => {
                values.insert(key.to_string(), v.to_string());
            }
            None => {
                values.remove(key);
            }
        }

        match self.flush(&values) {
            Ok(()) => {
                self.values = values;
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, path = %self.path.display(), "Settings write failed");
                false
            }
        }
    }

    fn reload(&mut self) -> Result<(), StoreError> {
        self.values = Self::read_values(&self.path)?;
        tracing::debug!(path = %self.path.display(), entries = self.values.len(), "Settings store reloaded");
        Ok(())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Settings store error type
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading/writing the store file
    IoError(std::io::Error),
    /// Store file is not a flat JSON object of strings
    ParseError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "I/O error: {}", e),
            StoreError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(e) => Some(e),
            StoreError::ParseError(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_int_defaults() {
        let store = MemoryStore::from_pairs([("a", "3"), ("b", "not a number")]);
        assert_eq!(store.get_int("a", 0), 3);
        assert_eq!(store.get_int("b", 7), 7);
        assert_eq!(store.get_int("missing", -1), -1);
    }

    #[test]
    fn test_put_string_none_deletes() {
        let mut store = MemoryStore::new();
        assert!(store.put_int("x", 5));
        assert!(store.contains("x"));
        assert!(store.put_string("x", None));
        assert!(!store.contains("x"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_string("k"), None);
        assert!(store.put_int("k", 42));
        assert!(store.put_string("s", Some("pkg/.Cls")));

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int("k", 0), 42);
        assert_eq!(reopened.get_string("s").as_deref(), Some("pkg/.Cls"));
    }

    #[test]
    fn test_file_store_reload_sees_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.put_int("enable_hw_keys", 1);

        fs::write(&path, r#"{ "enable_hw_keys": "0" }"#).unwrap();
        assert_eq!(store.get_int("enable_hw_keys", 1), 1);

        store.reload().unwrap();
        assert_eq!(store.get_int("enable_hw_keys", 1), 0);
    }

    #[test]
    fn test_file_store_skips_unchanged_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.put_int("k", 1));

        // Compact layout marks the file as untouched by the store
        let external = r#"{"k":"1","other":"x"}"#;
        fs::write(&path, external).unwrap();

        assert!(store.put_int("k", 1));
        assert!(store.remove("absent"));
        assert_eq!(fs::read_to_string(&path).unwrap(), external);
        assert_eq!(store.get_string("other").as_deref(), Some("x"));

        assert!(store.put_int("k", 2));
        assert_ne!(fs::read_to_string(&path).unwrap(), external);
    }

    #[test]
    fn test_file_store_keeps_external_keys_between_puts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.put_int("a", 1));

        fs::write(&path, r#"{ "a": "1", "ext": "7" }"#).unwrap();
        assert!(store.put_int("b", 2));

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int("a", 0), 1);
        assert_eq!(reopened.get_int("b", 0), 2);
        assert_eq!(reopened.get_int("ext", 0), 7);
        assert_eq!(store.get_int("ext", 0), 7);
    }

    #[test]
    fn test_file_store_compares_against_disk_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.put_int("enable_hw_keys", 1));

        // External writer flips the value; the cached copy still says 1
        fs::write(&path, r#"{ "enable_hw_keys": "0" }"#).unwrap();
        assert!(store.put_int("enable_hw_keys", 1));

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int("enable_hw_keys", 0), 1);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::ParseError(_)));
    }
}
