//! Recently searched usernames and their durable storage.
//!
//! The list is read once when a session starts and written back in full after
//! every change. Reading never fails from the caller's point of view: a
//! missing or corrupt entry simply yields an empty list.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::{debug, warn};

use crate::errors::Error;

#[cfg(test)]
#[path = "recents_tests.rs"]
mod tests;

/// Storage slot holding the recent searches.
pub const RECENTS_KEY: &str = "recent";

/// Maximum number of remembered searches.
pub const RECENTS_LIMIT: usize = 5;

/// Most-recent-first list of distinct usernames, never longer than
/// [`RECENTS_LIMIT`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentSearchList(Vec<String>);

impl RecentSearchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored entries, dropping blanks and duplicates and
    /// keeping at most [`RECENTS_LIMIT`] entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut list: Vec<String> = Vec::with_capacity(RECENTS_LIMIT);
        for entry in entries {
            if list.len() == RECENTS_LIMIT {
                break;
            }
            if entry.is_empty() || list.contains(&entry) {
                continue;
            }
            list.push(entry);
        }
        Self(list)
    }

    /// Moves `login` to the front, inserting it when absent.
    ///
    /// Returns `true` when the list changed.
    pub fn record(&mut self, login: &str) -> bool {
        if login.is_empty() {
            return false;
        }
        if self.0.first().map(String::as_str) == Some(login) {
            return false;
        }

        self.0.retain(|entry| entry != login);
        self.0.insert(0, login.to_string());
        self.0.truncate(RECENTS_LIMIT);
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Durable key/value storage for string lists.
///
/// Both operations are synchronous. Implementations store the list as a single
/// serialized value so a write either replaces the whole list or nothing.
pub trait RecentsStorage: Send + Sync {
    /// Reads the list stored under `key`. An absent key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored value cannot be read or decoded.
    fn read_list(&self, key: &str) -> Result<Vec<String>, Error>;

    /// Replaces the list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be encoded or written.
    fn write_list(&self, key: &str, list: &[String]) -> Result<(), Error>;
}

/// Stores each key as a JSON array in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::Storage(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl RecentsStorage for JsonFileStorage {
    fn read_list(&self, key: &str) -> Result<Vec<String>, Error> {
        let path = self.path_for(key)?;
        if !path.exists() {
            debug!(path = ?path, "No stored list");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let list: Vec<String> = serde_json::from_str(&content)?;
        Ok(list)
    }

    fn write_list(&self, key: &str, list: &[String]) -> Result<(), Error> {
        let path = self.path_for(key)?;
        let content = serde_json::to_string(list)?;

        fs::create_dir_all(&self.dir)?;

        // Readers never see a half-written file.
        let temp_path = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        debug!(path = ?path, count = list.len(), "Stored list");
        Ok(())
    }
}

/// In-memory storage holding raw serialized values.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage already holding `raw` under `key`, whether or not it
    /// is valid JSON.
    pub fn with_raw(key: &str, raw: &str) -> Self {
        let storage = Self::default();
        storage.set_raw(key, raw);
        storage
    }

    pub fn set_raw(&self, key: &str, raw: &str) {
        match self.values.lock() {
            Ok(mut values) => values.insert(key.to_string(), raw.to_string()),
            Err(poisoned) => poisoned
                .into_inner()
                .insert(key.to_string(), raw.to_string()),
        };
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        match self.values.lock() {
            Ok(values) => values.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }
}

impl RecentsStorage for MemoryStorage {
    fn read_list(&self, key: &str) -> Result<Vec<String>, Error> {
        match self.raw(key) {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_list(&self, key: &str, list: &[String]) -> Result<(), Error> {
        let raw = serde_json::to_string(list)?;
        self.set_raw(key, &raw);
        Ok(())
    }
}

/// The recents list bound to its storage slot.
pub struct PersistentRecents {
    storage: Arc<dyn RecentsStorage>,
    list: RecentSearchList,
}

impl PersistentRecents {
    /// Loads the list from `storage`.
    ///
    /// A storage failure is logged and treated as an empty list.
    pub fn load(storage: Arc<dyn RecentsStorage>) -> Self {
        let list = match storage.read_list(RECENTS_KEY) {
            Ok(entries) => RecentSearchList::from_entries(entries),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable recent searches");
                RecentSearchList::new()
            }
        };

        debug!(count = list.len(), "Loaded recent searches");
        Self { storage, list }
    }

    pub fn list(&self) -> &RecentSearchList {
        &self.list
    }

    /// Moves `login` to the front of the list and persists the change.
    pub fn record(&mut self, login: &str) {
        if self.list.record(login) {
            self.persist();
        }
    }

    /// Empties the list and persists the change.
    pub fn clear(&mut self) {
        self.list.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.write_list(RECENTS_KEY, self.list.entries()) {
            warn!(error = %e, "Failed to store recent searches");
        }
    }
}

impl std::fmt::Debug for PersistentRecents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentRecents")
            .field("list", &self.list)
            .finish()
    }
}
