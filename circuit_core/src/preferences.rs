//! User preferences persistence with file locking.
//!
//! Preferences live in a single JSON file that is replaced atomically on
//! every write. A missing or unreadable file means "no preferences yet",
//! which is also how a first-time user is recognised.

use crate::{Error, Result, UserPreferences};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persistence capability for user preferences
pub trait PreferencesStore {
    fn get(&self) -> Result<Option<UserPreferences>>;
    fn set(&mut self, preferences: &UserPreferences) -> Result<()>;

    /// True until preferences have been stored once
    fn is_first_time(&self) -> Result<bool> {
        Ok(self.get()?.is_none())
    }
}

/// JSON file preferences store
pub struct JsonPreferencesStore {
    path: PathBuf,
}

impl JsonPreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, modify them, and save them back
    ///
    /// `init` supplies the starting value when nothing is stored yet.
    pub fn update<I, F>(&mut self, init: I, f: F) -> Result<UserPreferences>
    where
        I: FnOnce() -> UserPreferences,
        F: FnOnce(&mut UserPreferences) -> Result<()>,
    {
        let mut preferences = self.get()?.unwrap_or_else(init);
        f(&mut preferences)?;
        self.set(&preferences)?;
        Ok(preferences)
    }
}

impl PreferencesStore for JsonPreferencesStore {
    /// Read preferences with a shared lock
    ///
    /// Corrupted or unreadable files are logged and treated as absent.
    fn get(&self) -> Result<Option<UserPreferences>> {
        let path = &self.path;
        if !path.exists() {
            tracing::debug!("No preferences file at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open preferences {:?}: {}. Ignoring.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock preferences {:?}: {}. Ignoring.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read preferences {:?}: {}. Ignoring.", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<UserPreferences>(&contents) {
            Ok(preferences) => {
                tracing::debug!("Loaded preferences from {:?}", path);
                Ok(Some(preferences))
            }
            Err(e) => {
                tracing::warn!("Failed to parse preferences {:?}: {}. Ignoring.", path, e);
                Ok(None)
            }
        }
    }

    /// Write via temp file + fsync + rename
    fn set(&mut self, preferences: &UserPreferences) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Store("preferences path missing parent".into()))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(preferences)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DifficultyLevel, MuscleGroup, WorkoutLocation};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_set_and_get_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonPreferencesStore::new(temp_dir.path().join("preferences.json"));

        let mut prefs = UserPreferences::new("user-1", Utc::now());
        prefs.preferred_difficulty = DifficultyLevel::Advanced;
        prefs.preferred_location = WorkoutLocation::Gym;
        prefs.preferred_muscle_groups = vec![MuscleGroup::Back, MuscleGroup::FullBody];
        store.set(&prefs).unwrap();

        assert_eq!(store.get().unwrap(), Some(prefs));
    }

    #[test]
    fn test_missing_file_means_first_time() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonPreferencesStore::new(temp_dir.path().join("preferences.json"));

        assert!(store.is_first_time().unwrap());
        store.set(&UserPreferences::new("user-1", Utc::now())).unwrap();
        assert!(!store.is_first_time().unwrap());
    }

    #[test]
    fn test_corrupted_file_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("preferences.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let store = JsonPreferencesStore::new(&path);
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_update_creates_then_modifies() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonPreferencesStore::new(temp_dir.path().join("preferences.json"));
        let session_id = Uuid::new_v4();

        store
            .update(
                || UserPreferences::new("user-1", Utc::now()),
                |prefs| {
                    prefs.record_workout(session_id, Utc::now());
                    Ok(())
                },
            )
            .unwrap();

        let loaded = store.get().unwrap().unwrap();
        assert_eq!(loaded.workout_history, vec![session_id]);
    }

    #[test]
    fn test_atomic_set_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonPreferencesStore::new(temp_dir.path().join("preferences.json"));
        store.set(&UserPreferences::new("user-1", Utc::now())).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "preferences.json")
            .collect();
        assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
    }
}
