//! Session persistence.
//!
//! Sessions are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. A session may be written more than
//! once (when the timer finishes, then again with feedback); readers keep
//! the last record for each id.

use crate::{Result, WorkoutSession};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Persistence capability for workout sessions
pub trait SessionStore {
    fn save(&mut self, session: &WorkoutSession) -> Result<()>;

    /// Every stored session, one entry per id, in first-saved order
    fn list_all(&self) -> Result<Vec<WorkoutSession>>;
}

/// JSONL-based session store with file locking
pub struct JsonlSessionStore {
    path: PathBuf,
}

impl JsonlSessionStore {
    /// Create a new JSONL store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionStore for JsonlSessionStore {
    fn save(&mut self, session: &WorkoutSession) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended session {} to {:?}", session.id, self.path);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<WorkoutSession>> {
        let records = read_sessions(&self.path)?;
        Ok(latest_per_id(records))
    }
}

/// Read every record from a session file, including superseded ones
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, bytes) in reader.split(b'\n').enumerate() {
        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Skipping non-UTF-8 session at line {}: {}", line_num + 1, e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} session records from {:?}", sessions.len(), path);
    Ok(sessions)
}

/// Collapse repeated records: the last write for an id wins, but the id keeps
/// the position of its first write.
fn latest_per_id(records: Vec<WorkoutSession>) -> Vec<WorkoutSession> {
    let mut position: HashMap<Uuid, usize> = HashMap::new();
    let mut sessions: Vec<WorkoutSession> = Vec::new();

    for record in records {
        match position.get(&record.id) {
            Some(&idx) => sessions[idx] = record,
            None => {
                position.insert(record.id, sessions.len());
                sessions.push(record);
            }
        }
    }

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DifficultyLevel, MuscleGroup, PlanConstraints, WorkoutLocation, WorkoutPlan,
    };
    use chrono::Utc;

    fn create_test_session() -> WorkoutSession {
        let plan = WorkoutPlan {
            constraints: PlanConstraints::new(
                [MuscleGroup::Chest],
                DifficultyLevel::Beginner,
                WorkoutLocation::Home,
                900,
                30,
            ),
            exercises: vec![],
            total_duration_seconds: 0,
        };
        WorkoutSession::start(plan, Some("user-1".into()), Utc::now())
    }

    #[test]
    fn test_save_and_list_single_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let session = create_test_session();
        let mut store = JsonlSessionStore::new(&path);
        store.save(&session).unwrap();

        let sessions = store.list_all().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session.id);
        assert_eq!(sessions[0].user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_save_multiple_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlSessionStore::new(temp_dir.path().join("sessions.jsonl"));

        for _ in 0..5 {
            store.save(&create_test_session()).unwrap();
        }

        assert_eq!(store.list_all().unwrap().len(), 5);
    }

    #[test]
    fn test_resave_replaces_record_in_place() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");
        let mut store = JsonlSessionStore::new(&path);

        let mut first = create_test_session();
        let second = create_test_session();
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        first.user_difficulty_rating = Some(4);
        store.save(&first).unwrap();

        assert_eq!(read_sessions(&path).unwrap().len(), 3);

        let sessions = store.list_all().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first.id);
        assert_eq!(sessions[0].user_difficulty_rating, Some(4));
        assert_eq!(sessions[1].id, second.id);
    }

    #[test]
    fn test_list_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlSessionStore::new(temp_dir.path().join("nonexistent.jsonl"));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut store = JsonlSessionStore::new(&path);
        store.save(&create_test_session()).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ invalid json }}").unwrap();
        write!(file, "{{\"id\":\"partial").unwrap();

        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut store = JsonlSessionStore::new(&path);
        let first = create_test_session();
        store.save(&first).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xff, 0xfe, b'\n']).unwrap();
        drop(file);

        let second = create_test_session();
        store.save(&second).unwrap();

        let sessions = store.list_all().unwrap();
        let ids: Vec<_> = sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/dir/sessions.jsonl");

        let mut store = JsonlSessionStore::new(&path);
        store.save(&create_test_session()).unwrap();

        assert!(path.exists());
    }
}
