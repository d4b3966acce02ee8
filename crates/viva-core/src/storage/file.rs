//! File-backed storage.
//!
//! All keys live in a single `storage.json` object. The file is read once
//! when the store is opened and rewritten on every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

const STORAGE_FILE: &str = "storage.json";
const STORAGE_TEMP_FILE: &str = "storage.json.tmp";

/// Durable store persisted as a JSON object in `<dir>/storage.json`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store in `dir`, loading any existing entries.
    ///
    /// A missing directory or file yields an empty store; the directory is
    /// created on the first write. A file that exists but is not a JSON
    /// object of strings is an error.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        let entries = load_entries(&dir)?;
        log::debug!("Opened storage at {} ({} keys)", dir.display(), entries.len());
        Ok(Self {
            dir,
            entries: Mutex::new(entries),
        })
    }

    /// Directory holding `storage.json`.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn mutate<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = entries.clone();
        f(&mut next);
        save_entries(&self.dir, &next)?;
        *entries = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

fn load_entries(dir: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    let file_path = dir.join(STORAGE_FILE);

    if !file_path.exists() {
        return Ok(BTreeMap::new());
    }

    let contents = fs::read_to_string(&file_path)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    Ok(serde_json::from_str(&contents)?)
}

/// Write-then-rename so a crash mid-write never leaves a truncated file.
fn save_entries(dir: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;

    let file_path = dir.join(STORAGE_FILE);
    let temp_path = dir.join(STORAGE_TEMP_FILE);

    let json = serde_json::to_string_pretty(entries)?;
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, &file_path)?;

    Ok(())
}
