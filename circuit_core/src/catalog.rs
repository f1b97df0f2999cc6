//! Exercise catalog: the built-in exercise table and the query interface
//! the curriculum builder consumes.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Read-only query interface over exercise data
pub trait ExerciseCatalog {
    /// All exercises tagged with `group`, in catalog order
    fn query_by_muscle_group(&self, group: MuscleGroup) -> Vec<&Exercise>;

    /// Look up a single exercise by id
    fn query_by_id(&self, id: &str) -> Option<&Exercise>;
}

/// In-memory exercise catalog
///
/// Exercises are kept in insertion order so query results (and therefore
/// seeded curriculum generation) are reproducible.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
}

impl ExerciseCatalog for Catalog {
    fn query_by_muscle_group(&self, group: MuscleGroup) -> Vec<&Exercise> {
        self.exercises.iter().filter(|e| e.targets(group)).collect()
    }

    fn query_by_id(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

impl Catalog {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    /// Default catalog extended with user-defined exercises
    ///
    /// A custom exercise whose id collides with an existing one is reported
    /// by [`Catalog::validate`], not silently merged.
    pub fn with_custom(custom: &[Exercise]) -> Self {
        let mut catalog = get_default_catalog().clone();
        catalog.exercises.extend(custom.iter().cloned());
        if !custom.is_empty() {
            tracing::info!("Added {} custom exercises to catalog", custom.len());
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            let id = &exercise.id;
            if id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            } else if !seen.insert(id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", id));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if exercise.muscle_groups.is_empty() {
                errors.push(format!("Exercise '{}' targets no muscle group", id));
            }
            if exercise.duration_seconds == 0 {
                errors.push(format!("Exercise '{}' has zero duration", id));
            }
            if exercise.equipment.iter().any(|e| e.trim().is_empty()) {
                errors.push(format!("Exercise '{}' lists blank equipment", id));
            }
        }

        errors
    }
}

fn steps(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// Builds the default catalog with the built-in exercises
pub fn build_default_catalog() -> Catalog {
    let exercises = vec![
        // ====================================================================
        // Chest
        // ====================================================================
        Exercise {
            id: "push-ups".into(),
            name: "Push-ups".into(),
            description: "Classic bodyweight exercise for chest and triceps".into(),
            instructions: steps(&[
                "Start in a plank position with hands shoulder-width apart",
                "Lower your body until chest nearly touches the ground",
                "Push back up to starting position",
                "Keep your body in a straight line throughout",
            ]),
            muscle_groups: vec![MuscleGroup::Chest, MuscleGroup::Arms],
            difficulty: DifficultyLevel::Beginner,
            duration_seconds: 60,
            rest_seconds: 30,
            sets: Some(3),
            reps: Some(10),
            equipment: vec![],
        },
        Exercise {
            id: "diamond-push-ups".into(),
            name: "Diamond Push-ups".into(),
            description: "Advanced push-up variation targeting triceps".into(),
            instructions: steps(&[
                "Form a diamond shape with your hands under your chest",
                "Lower your body while keeping elbows close to body",
                "Push back up to starting position",
            ]),
            muscle_groups: vec![MuscleGroup::Chest, MuscleGroup::Arms],
            difficulty: DifficultyLevel::Intermediate,
            duration_seconds: 45,
            rest_seconds: 45,
            sets: Some(3),
            reps: Some(8),
            equipment: vec![],
        },
        // ====================================================================
        // Back
        // ====================================================================
        Exercise {
            id: "superman".into(),
            name: "Superman".into(),
            description: "Isometric exercise for lower back strength".into(),
            instructions: steps(&[
                "Lie face down on the floor",
                "Lift your arms and legs off the ground",
                "Hold for 3-5 seconds",
                "Lower back down and repeat",
            ]),
            muscle_groups: vec![MuscleGroup::Back],
            difficulty: DifficultyLevel::Beginner,
            duration_seconds: 60,
            rest_seconds: 30,
            sets: Some(3),
            reps: Some(12),
            equipment: vec![],
        },
        Exercise {
            id: "pull-ups".into(),
            name: "Pull-ups".into(),
            description: "Upper body pulling exercise".into(),
            instructions: steps(&[
                "Hang from a pull-up bar with hands shoulder-width apart",
                "Pull your body up until chin is over the bar",
                "Lower back down with control",
            ]),
            muscle_groups: vec![MuscleGroup::Back, MuscleGroup::Arms],
            difficulty: DifficultyLevel::Advanced,
            duration_seconds: 60,
            rest_seconds: 60,
            sets: Some(3),
            reps: Some(5),
            equipment: vec!["pull-up bar".into()],
        },
        // ====================================================================
        // Shoulders and arms
        // ====================================================================
        Exercise {
            id: "pike-push-ups".into(),
            name: "Pike Push-ups".into(),
            description: "Bodyweight shoulder press variation".into(),
            instructions: steps(&[
                "Start in a downward dog position",
                "Lower your head toward the ground",
                "Push back up to starting position",
            ]),
            muscle_groups: vec![MuscleGroup::Shoulders, MuscleGroup::Arms],
            difficulty: DifficultyLevel::Intermediate,
            duration_seconds: 45,
            rest_seconds: 45,
            sets: Some(3),
            reps: Some(8),
            equipment: vec![],
        },
        Exercise {
            id: "tricep-dips".into(),
            name: "Tricep Dips".into(),
            description: "Bodyweight exercise for triceps".into(),
            instructions: steps(&[
                "Sit on the edge of a chair or bench",
                "Place hands on the edge beside your hips",
                "Slide off and lower your body",
                "Push back up using your triceps",
            ]),
            muscle_groups: vec![MuscleGroup::Arms],
            difficulty: DifficultyLevel::Beginner,
            duration_seconds: 60,
            rest_seconds: 45,
            sets: Some(3),
            reps: Some(12),
            equipment: vec!["chair".into(), "bench".into()],
        },
        // ====================================================================
        // Legs
        // ====================================================================
        Exercise {
            id: "squats".into(),
            name: "Bodyweight Squats".into(),
            description: "Fundamental lower body exercise".into(),
            instructions: steps(&[
                "Stand with feet shoulder-width apart",
                "Lower your body as if sitting back into a chair",
                "Keep your chest up and knees behind toes",
                "Return to standing position",
            ]),
            muscle_groups: vec![MuscleGroup::Legs],
            difficulty: DifficultyLevel::Beginner,
            duration_seconds: 60,
            rest_seconds: 30,
            sets: Some(3),
            reps: Some(15),
            equipment: vec![],
        },
        Exercise {
            id: "lunges".into(),
            name: "Walking Lunges".into(),
            description: "Dynamic leg exercise for balance and strength".into(),
            instructions: steps(&[
                "Step forward with one leg",
                "Lower your body until both knees are bent",
                "Push back up and step forward with the other leg",
                "Continue alternating legs",
            ]),
            muscle_groups: vec![MuscleGroup::Legs],
            difficulty: DifficultyLevel::Intermediate,
            duration_seconds: 60,
            rest_seconds: 45,
            sets: Some(3),
            reps: Some(10),
            equipment: vec![],
        },
        // ====================================================================
        // Core
        // ====================================================================
        Exercise {
            id: "plank".into(),
            name: "Plank".into(),
            description: "Isometric core exercise".into(),
            instructions: steps(&[
                "Hold a push-up position with arms straight",
                "Keep your body in a straight line",
                "Engage your core muscles",
                "Hold for the specified time",
            ]),
            muscle_groups: vec![MuscleGroup::Core],
            difficulty: DifficultyLevel::Beginner,
            duration_seconds: 45,
            rest_seconds: 30,
            sets: Some(3),
            reps: Some(1),
            equipment: vec![],
        },
        Exercise {
            id: "crunches".into(),
            name: "Crunches".into(),
            description: "Basic abdominal exercise".into(),
            instructions: steps(&[
                "Lie on your back with knees bent",
                "Place hands behind your head",
                "Lift your shoulders off the ground",
                "Lower back down with control",
            ]),
            muscle_groups: vec![MuscleGroup::Core],
            difficulty: DifficultyLevel::Beginner,
            duration_seconds: 60,
            rest_seconds: 30,
            sets: Some(3),
            reps: Some(15),
            equipment: vec![],
        },
        // ====================================================================
        // Full body
        // ====================================================================
        Exercise {
            id: "burpees".into(),
            name: "Burpees".into(),
            description: "High-intensity full body exercise".into(),
            instructions: steps(&[
                "Start standing, then squat down",
                "Place hands on ground and jump feet back",
                "Do a push-up",
                "Jump feet back to squat position",
                "Jump up with arms overhead",
            ]),
            muscle_groups: vec![MuscleGroup::FullBody],
            difficulty: DifficultyLevel::Advanced,
            duration_seconds: 60,
            rest_seconds: 60,
            sets: Some(3),
            reps: Some(8),
            equipment: vec![],
        },
        Exercise {
            id: "mountain-climbers".into(),
            name: "Mountain Climbers".into(),
            description: "Dynamic cardio exercise".into(),
            instructions: steps(&[
                "Start in a plank position",
                "Alternately bring knees toward chest",
                "Keep your core engaged throughout",
            ]),
            muscle_groups: vec![MuscleGroup::FullBody, MuscleGroup::Core],
            difficulty: DifficultyLevel::Intermediate,
            duration_seconds: 45,
            rest_seconds: 30,
            sets: Some(3),
            reps: Some(20),
            equipment: vec![],
        },
    ];

    Catalog { exercises }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.len(), 12);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_every_muscle_group_has_exercises() {
        let catalog = get_default_catalog();
        for group in MuscleGroup::ALL {
            assert!(
                !catalog.query_by_muscle_group(group).is_empty(),
                "No exercises for {}",
                group
            );
        }
    }

    #[test]
    fn test_query_by_muscle_group_keeps_catalog_order() {
        let catalog = get_default_catalog();
        let ids: Vec<_> = catalog
            .query_by_muscle_group(MuscleGroup::Core)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["plank", "crunches", "mountain-climbers"]);
    }

    #[test]
    fn test_query_by_id() {
        let catalog = get_default_catalog();
        assert_eq!(catalog.query_by_id("burpees").unwrap().name, "Burpees");
        assert!(catalog.query_by_id("jumping-jacks").is_none());
    }

    #[test]
    fn test_duplicate_custom_exercise_is_reported() {
        let dup = get_default_catalog().query_by_id("plank").unwrap().clone();
        let catalog = Catalog::with_custom(&[dup]);
        let errors = catalog.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("plank"));
    }
}
