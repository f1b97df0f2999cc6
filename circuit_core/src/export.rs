//! CSV export of recorded sessions.

use crate::{Result, WorkoutSession};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    created_at: String,
    muscle_groups: String,
    difficulty: String,
    location: String,
    exercise_count: usize,
    completed_count: usize,
    planned_seconds: u32,
    elapsed_seconds: Option<u32>,
    rating: Option<u8>,
    notes: Option<String>,
}

impl From<&WorkoutSession> for CsvRow {
    fn from(session: &WorkoutSession) -> Self {
        let constraints = &session.plan.constraints;
        let muscle_groups: Vec<&str> =
            constraints.muscle_groups.iter().map(|g| g.as_str()).collect();

        CsvRow {
            id: session.id.to_string(),
            created_at: session.created_at.to_rfc3339(),
            muscle_groups: muscle_groups.join(";"),
            difficulty: constraints.difficulty.to_string(),
            location: constraints.location.to_string(),
            exercise_count: session.plan.exercises.len(),
            completed_count: session.completed_exercises.len(),
            planned_seconds: session.plan.total_duration_seconds,
            elapsed_seconds: session.elapsed_seconds,
            rating: session.user_difficulty_rating,
            notes: session.notes.clone(),
        }
    }
}

/// Write sessions to a CSV file, replacing any existing file
///
/// Returns the number of rows written. The header row is written even when
/// there are no sessions.
pub fn export_sessions_csv(sessions: &[WorkoutSession], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record([
        "id",
        "created_at",
        "muscle_groups",
        "difficulty",
        "location",
        "exercise_count",
        "completed_count",
        "planned_seconds",
        "elapsed_seconds",
        "rating",
        "notes",
    ])?;

    for session in sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} sessions to {:?}", sessions.len(), path);
    Ok(sessions.len())
}
