//! Session history queries.
//!
//! These operate on the list returned by [`SessionStore::list_all`], so any
//! store implementation gets the same views.
//!
//! [`SessionStore::list_all`]: crate::SessionStore::list_all

use crate::{Result, SessionStore, WorkoutSession};

/// The `limit` most recent sessions, newest first
pub fn recent_sessions(sessions: &[WorkoutSession], limit: usize) -> Vec<&WorkoutSession> {
    let mut sorted: Vec<&WorkoutSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Sessions recorded for one user, in store order
pub fn sessions_for_user<'a>(
    sessions: &'a [WorkoutSession],
    user_id: &str,
) -> Vec<&'a WorkoutSession> {
    sessions
        .iter()
        .filter(|s| s.user_id.as_deref() == Some(user_id))
        .collect()
}

/// Load everything from a store and return the most recent sessions
pub fn load_recent_sessions<S>(store: &S, limit: usize) -> Result<Vec<WorkoutSession>>
where
    S: SessionStore + ?Sized,
{
    let sessions = store.list_all()?;
    let recent: Vec<WorkoutSession> = recent_sessions(&sessions, limit)
        .into_iter()
        .cloned()
        .collect();

    tracing::info!(
        "Loaded {} recent sessions out of {} stored",
        recent.len(),
        sessions.len()
    );

    Ok(recent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DifficultyLevel, JsonlSessionStore, MuscleGroup, PlanConstraints, WorkoutLocation,
        WorkoutPlan,
    };
    use chrono::{Duration, Utc};

    fn create_test_session(user: Option<&str>, days_ago: i64) -> WorkoutSession {
        let plan = WorkoutPlan {
            constraints: PlanConstraints::new(
                [MuscleGroup::Legs],
                DifficultyLevel::Beginner,
                WorkoutLocation::Home,
                900,
                30,
            ),
            exercises: vec![],
            total_duration_seconds: 0,
        };
        WorkoutSession::start(
            plan,
            user.map(str::to_string),
            Utc::now() - Duration::days(days_ago),
        )
    }

    #[test]
    fn test_recent_sessions_sorted_newest_first() {
        let old = create_test_session(None, 5);
        let new = create_test_session(None, 1);
        let middle = create_test_session(None, 3);
        let sessions = vec![old.clone(), new.clone(), middle.clone()];

        let recent = recent_sessions(&sessions, 10);
        let ids: Vec<_> = recent.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![new.id, middle.id, old.id]);
    }

    #[test]
    fn test_recent_sessions_respects_limit() {
        let sessions: Vec<_> = (0..5).map(|d| create_test_session(None, d)).collect();
        assert_eq!(recent_sessions(&sessions, 2).len(), 2);
        assert!(recent_sessions(&sessions, 0).is_empty());
    }

    #[test]
    fn test_sessions_for_user() {
        let sessions = vec![
            create_test_session(Some("alice"), 1),
            create_test_session(Some("bob"), 2),
            create_test_session(None, 3),
            create_test_session(Some("alice"), 4),
        ];

        assert_eq!(sessions_for_user(&sessions, "alice").len(), 2);
        assert_eq!(sessions_for_user(&sessions, "bob").len(), 1);
        assert!(sessions_for_user(&sessions, "carol").is_empty());
    }

    #[test]
    fn test_load_recent_sessions_from_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlSessionStore::new(temp_dir.path().join("sessions.jsonl"));

        let old = create_test_session(None, 4);
        let new = create_test_session(None, 1);
        store.save(&old).unwrap();
        store.save(&new).unwrap();

        let recent = load_recent_sessions(&store, 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, new.id);
    }
}
