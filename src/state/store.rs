//! Durable storage for instance state records.
//!
//! One file per resource, MessagePack-encoded, written atomically via a
//! temp file in the target directory followed by a rename. The schema
//! version rides in the envelope next to the record so a loader knows which
//! migration chain still applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::core::{Result, StateError};
use crate::state::InstanceState;

/// Durable envelope for one resource state record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredState {
    pub schema_version: u32,
    pub state: InstanceState,
    pub updated_at: DateTime<Utc>,
}

impl StoredState {
    pub fn new(schema_version: u32, state: InstanceState) -> Self {
        Self {
            schema_version,
            state,
            updated_at: Utc::now(),
        }
    }
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, stored: &StoredState) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| {
                    StateError::Io(format!("failed to create state directory: {}", e))
                })?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let serialized = rmp_serde::to_vec(stored)
            .map_err(|e| StateError::Encode(format!("failed to serialize state: {}", e)))?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| StateError::Io(format!("failed to create temp state file: {}", e)))?;
        temp.write_all(&serialized)
            .map_err(|e| StateError::Io(format!("failed to write state: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StateError::Io(format!("failed to sync state: {}", e)))?;
        temp.persist(&self.path)
            .map_err(|e| StateError::Io(format!("failed to persist state file: {}", e)))?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<StoredState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut file = File::open(&self.path)
            .map_err(|e| StateError::Io(format!("failed to open state file: {}", e)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| StateError::Io(format!("failed to read state file: {}", e)))?;
        let stored: StoredState = rmp_serde::from_slice(&data)
            .map_err(|e| StateError::Encode(format!("failed to deserialize state: {}", e)))?;
        Ok(Some(stored))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| StateError::Io(format!("failed to delete state file: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> InstanceState {
        let mut state = InstanceState::new("vm-0451");
        state.set_attr("uuid", "422c9d-aa");
        state.set_attr("disk.#", "2");
        state.set_attr("disk.0.size", "20");
        state
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("vm.state"));

        store.save(&StoredState::new(1, sample_state())).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.schema_version, 1);
        assert_eq!(loaded.state, sample_state());
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("absent.state"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_version() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("vm.state"));

        store.save(&StoredState::new(0, sample_state())).unwrap();
        let mut migrated = sample_state();
        migrated.set_attr("imported", "true");
        store.save(&StoredState::new(2, migrated.clone())).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.schema_version, 2);
        assert_eq!(loaded.state, migrated);
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("vm.state"));

        store.save(&StoredState::new(1, sample_state())).unwrap();
        store.delete().unwrap();
        assert!(!store.exists());
        // Deleting an absent file is not an error.
        store.delete().unwrap();
    }
}
