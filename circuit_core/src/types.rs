//! Core domain types for the Circuit workout system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle groups, difficulty levels and workout locations
//! - Catalog exercises
//! - Workout plans and their entries
//! - Persisted workout sessions
//! - User preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

// ============================================================================
// Selection Types
// ============================================================================

/// Body region targeted by an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    FullBody,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 7] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Arms,
        MuscleGroup::Legs,
        MuscleGroup::Core,
        MuscleGroup::FullBody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Arms => "arms",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Core => "core",
            MuscleGroup::FullBody => "full-body",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chest" => Ok(MuscleGroup::Chest),
            "back" => Ok(MuscleGroup::Back),
            "shoulders" => Ok(MuscleGroup::Shoulders),
            "arms" => Ok(MuscleGroup::Arms),
            "legs" => Ok(MuscleGroup::Legs),
            "core" => Ok(MuscleGroup::Core),
            "full-body" | "full_body" => Ok(MuscleGroup::FullBody),
            other => Err(Error::Other(format!("Unknown muscle group: {}", other))),
        }
    }
}

/// Exercise intensity tag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(Error::Other(format!("Unknown difficulty level: {}", other))),
        }
    }
}

/// Workout environment, used to gate equipment-dependent exercises
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutLocation {
    #[default]
    Home,
    Gym,
    Outdoor,
    Office,
}

impl WorkoutLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutLocation::Home => "home",
            WorkoutLocation::Gym => "gym",
            WorkoutLocation::Outdoor => "outdoor",
            WorkoutLocation::Office => "office",
        }
    }

    /// Whether exercises needing equipment may be scheduled here
    pub fn allows_equipment(&self) -> bool {
        matches!(self, WorkoutLocation::Gym | WorkoutLocation::Outdoor)
    }
}

impl fmt::Display for WorkoutLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(WorkoutLocation::Home),
            "gym" => Ok(WorkoutLocation::Gym),
            "outdoor" => Ok(WorkoutLocation::Outdoor),
            "office" => Ok(WorkoutLocation::Office),
            other => Err(Error::Other(format!("Unknown workout location: {}", other))),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// An immutable catalog exercise (e.g., "Push-ups")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub muscle_groups: Vec<MuscleGroup>,
    pub difficulty: DifficultyLevel,
    pub duration_seconds: u32,
    pub rest_seconds: u32,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl Exercise {
    pub fn needs_equipment(&self) -> bool {
        !self.equipment.is_empty()
    }

    pub fn targets(&self, group: MuscleGroup) -> bool {
        self.muscle_groups.contains(&group)
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// One entry in a workout plan
///
/// Durations are copied from the exercise when the plan is built and are
/// never recomputed afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub order: u32,
    pub duration_seconds: u32,
    pub rest_seconds: u32,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

/// The constraint set a plan was generated from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanConstraints {
    pub muscle_groups: Vec<MuscleGroup>,
    pub difficulty: DifficultyLevel,
    pub location: WorkoutLocation,
    pub target_duration_seconds: u32,
    pub rest_seconds: u32,
}

impl PlanConstraints {
    /// Build a constraint set; repeated muscle groups are dropped, keeping
    /// the first occurrence.
    pub fn new(
        muscle_groups: impl IntoIterator<Item = MuscleGroup>,
        difficulty: DifficultyLevel,
        location: WorkoutLocation,
        target_duration_seconds: u32,
        rest_seconds: u32,
    ) -> Self {
        let mut groups = Vec::new();
        for group in muscle_groups {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        Self {
            muscle_groups: groups,
            difficulty,
            location,
            target_duration_seconds,
            rest_seconds,
        }
    }
}

/// An ordered, duration-bounded sequence of exercises for one workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub constraints: PlanConstraints,
    pub exercises: Vec<WorkoutExercise>,
    pub total_duration_seconds: u32,
}

// ============================================================================
// Session Types
// ============================================================================

/// A recorded workout attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub plan: WorkoutPlan,
    #[serde(default)]
    pub completed_exercises: Vec<String>,
    #[serde(default)]
    pub elapsed_seconds: Option<u32>,
    #[serde(default)]
    pub user_difficulty_rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WorkoutSession {
    /// Start a new session for a plan
    pub fn start(plan: WorkoutPlan, user_id: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            plan,
            completed_exercises: Vec::new(),
            elapsed_seconds: None,
            user_difficulty_rating: None,
            notes: None,
        }
    }
}

/// Phase of the live workout timer (never persisted)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    Exercise,
    Rest,
    Completed,
}

// ============================================================================
// Preference Types
// ============================================================================

/// User defaults remembered between workouts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    pub user_id: String,
    pub default_rest_time: u32,
    pub preferred_difficulty: DifficultyLevel,
    pub preferred_location: WorkoutLocation,
    #[serde(default)]
    pub preferred_muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub workout_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            default_rest_time: 45,
            preferred_difficulty: DifficultyLevel::Intermediate,
            preferred_location: WorkoutLocation::Home,
            preferred_muscle_groups: Vec::new(),
            workout_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a finished session to the history
    pub fn record_workout(&mut self, session_id: Uuid, now: DateTime<Utc>) {
        if !self.workout_history.contains(&session_id) {
            self.workout_history.push(session_id);
        }
        self.updated_at = now;
    }
}
