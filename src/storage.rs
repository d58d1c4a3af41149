//! JSON file storage adapter for the state store
//!
//! One file per storage key inside the data directory. Writes go to a
//! temporary file that is renamed over the target, and the previous version
//! is kept next to it as `<key>.json.bak`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lockin_core::{CoreError, StorageBackend, StorageKey};
use tracing::debug;

use crate::error::{CliError, Result};

/// JSON file storage adapter
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Create a new storage adapter rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    fn backup_path(&self, key: StorageKey) -> PathBuf {
        self.path_for(key).with_extension("json.bak")
    }

    /// Copy the current file for `key` to its backup
    pub fn backup(&self, key: StorageKey) -> Result<()> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(()); // Nothing to backup
        }

        fs::copy(&path, self.backup_path(key))
            .map_err(|e| CliError::io(format!("Failed to back up {}", path.display()), e))?;
        Ok(())
    }

    /// Check if any backup exists
    pub fn backup_exists(&self) -> bool {
        StorageKey::ALL.iter().any(|key| self.backup_path(*key).exists())
    }

    /// Restore every key that has a readable backup
    ///
    /// Backups that are not valid JSON are left alone. Returns the restored keys.
    pub fn recover(&self) -> Result<Vec<StorageKey>> {
        if !self.backup_exists() {
            return Err(CliError::storage("Backup file not found"));
        }

        let mut restored = Vec::new();
        for key in StorageKey::ALL {
            let backup = self.backup_path(key);
            if !backup.exists() {
                continue;
            }

            let contents = fs::read_to_string(&backup)
                .map_err(|e| CliError::io(format!("Failed to read {}", backup.display()), e))?;
            if serde_json::from_str::<serde_json::Value>(&contents).is_err() {
                tracing::warn!(key = %key, "Backup is not valid JSON, skipping");
                continue;
            }

            write_atomic(&self.path_for(key), &contents)?;
            restored.push(key);
        }

        Ok(restored)
    }

    fn save(&self, key: StorageKey, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| CliError::io(format!("Failed to create {}", self.dir.display()), e))?;

        // Create backup before saving
        self.backup(key)?;
        write_atomic(&self.path_for(key), value)?;
        debug!(key = %key, bytes = value.len(), "Saved state file");
        Ok(())
    }
}

impl StorageBackend for JsonFileStorage {
    fn read(&self, key: StorageKey) -> lockin_core::Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::storage_with_source(
                format!("Failed to read {}", path.display()),
                e,
            )),
        }
    }

    fn write(&mut self, key: StorageKey, value: &str) -> lockin_core::Result<()> {
        self.save(key, value)
            .map_err(|e| CoreError::storage_with_source(format!("Failed to write {}", key), e))
    }
}

/// Write through a temporary file and rename it over the target
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)
        .map_err(|e| CliError::io(format!("Failed to write {}", tmp.display()), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| CliError::io(format!("Failed to replace {}", path.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockin_core::{SilentObserver, Store, TaskDraft};
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_key() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert_eq!(storage.read(StorageKey::Tasks).unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(dir.path().join("nested"));

        storage.write(StorageKey::Schedule, "[]").unwrap();
        assert_eq!(storage.read(StorageKey::Schedule).unwrap().as_deref(), Some("[]"));
        assert!(storage.path_for(StorageKey::Schedule).ends_with("schedule.json"));
        assert!(!storage.path_for(StorageKey::Schedule).with_extension("json.tmp").exists());
    }

    #[test]
    fn test_second_write_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());

        storage.write(StorageKey::Tasks, "[1]").unwrap();
        assert!(!storage.backup_exists());

        storage.write(StorageKey::Tasks, "[2]").unwrap();
        assert!(storage.backup_exists());
        let backup = fs::read_to_string(dir.path().join("tasks.json.bak")).unwrap();
        assert_eq!(backup, "[1]");
    }

    #[test]
    fn test_recover_restores_previous_version() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());

        storage.write(StorageKey::Tasks, "[\"old\"]").unwrap();
        storage.write(StorageKey::Tasks, "[\"new\"]").unwrap();

        let restored = storage.recover().unwrap();
        assert_eq!(restored, vec![StorageKey::Tasks]);
        assert_eq!(
            storage.read(StorageKey::Tasks).unwrap().as_deref(),
            Some("[\"old\"]")
        );
    }

    #[test]
    fn test_recover_without_backup_fails() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.recover().is_err());
    }

    #[test]
    fn test_store_survives_reload() {
        let dir = TempDir::new().unwrap();

        let mut store = Store::load(JsonFileStorage::new(dir.path()), SilentObserver);
        let id = store.add_task(TaskDraft::new("Write report")).unwrap();

        let reloaded = Store::load(JsonFileStorage::new(dir.path()), SilentObserver);
        assert_eq!(reloaded.task(&id).unwrap().title, "Write report");
    }
}
