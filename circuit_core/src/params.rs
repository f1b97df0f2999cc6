//! Plan requests: the boundary between user input and [`PlanConstraints`].
//!
//! Parameters arrive as loose key/value strings (navigation parameters, CLI
//! flags, config defaults). Parsing is lenient and never fails; range
//! checking is a separate, explicit step.

use crate::{
    DifficultyLevel, Error, MuscleGroup, PlanConstraints, Result, UserPreferences,
    WorkoutLocation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_REST_SECONDS: u32 = 45;

pub const MIN_DURATION_MINUTES: u32 = 10;
pub const MAX_DURATION_MINUTES: u32 = 120;
pub const MIN_REST_SECONDS: u32 = 15;
pub const MAX_REST_SECONDS: u32 = 120;

/// Named duration/rest combination
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationPreset {
    pub name: &'static str,
    pub duration_minutes: u32,
    pub rest_seconds: u32,
}

pub const DURATION_PRESETS: [DurationPreset; 4] = [
    DurationPreset {
        name: "Quick",
        duration_minutes: 15,
        rest_seconds: 30,
    },
    DurationPreset {
        name: "Standard",
        duration_minutes: 30,
        rest_seconds: 45,
    },
    DurationPreset {
        name: "Extended",
        duration_minutes: 45,
        rest_seconds: 60,
    },
    DurationPreset {
        name: "Intensive",
        duration_minutes: 60,
        rest_seconds: 30,
    },
];

/// Case-insensitive preset lookup
pub fn find_preset(name: &str) -> Option<&'static DurationPreset> {
    DURATION_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// Human-readable duration: "45 min", "1h", "1h 30m"
pub fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Everything needed to build a plan, in user-facing units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub muscle_groups: Vec<MuscleGroup>,
    pub difficulty: DifficultyLevel,
    pub location: WorkoutLocation,
    pub duration_minutes: u32,
    pub rest_seconds: u32,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            muscle_groups: Vec::new(),
            difficulty: DifficultyLevel::Beginner,
            location: WorkoutLocation::Home,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            rest_seconds: DEFAULT_REST_SECONDS,
        }
    }
}

impl PlanRequest {
    /// Parse navigation-style parameters
    ///
    /// Recognised keys: `muscles` (comma separated), `difficulty`,
    /// `duration` (minutes), `restTime` (seconds), `location`. Missing or
    /// malformed values fall back to defaults and unknown muscle tokens are
    /// dropped.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut request = Self::default();

        if let Some(muscles) = params.get("muscles") {
            request.muscle_groups = parse_muscle_list(muscles);
        }
        if let Some(difficulty) = params.get("difficulty") {
            request.difficulty = lenient(difficulty, "difficulty", request.difficulty);
        }
        if let Some(location) = params.get("location") {
            request.location = lenient(location, "location", request.location);
        }
        if let Some(duration) = params.get("duration") {
            request.duration_minutes = lenient(duration, "duration", request.duration_minutes);
        }
        if let Some(rest) = params.get("restTime") {
            request.rest_seconds = lenient(rest, "restTime", request.rest_seconds);
        }

        request
    }

    /// Quick-start request derived from stored preferences
    pub fn from_preferences(preferences: &UserPreferences) -> Self {
        let muscle_groups = if preferences.preferred_muscle_groups.is_empty() {
            vec![MuscleGroup::FullBody]
        } else {
            preferences.preferred_muscle_groups.clone()
        };

        Self {
            muscle_groups,
            difficulty: preferences.preferred_difficulty,
            location: preferences.preferred_location,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            rest_seconds: preferences.default_rest_time,
        }
    }

    pub fn with_preset(mut self, preset: &DurationPreset) -> Self {
        self.duration_minutes = preset.duration_minutes;
        self.rest_seconds = preset.rest_seconds;
        self
    }

    /// Reject durations and rests outside the selectable ranges
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(Error::Config(format!(
                "duration must be {}-{} minutes, got {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, self.duration_minutes
            )));
        }
        if !(MIN_REST_SECONDS..=MAX_REST_SECONDS).contains(&self.rest_seconds) {
            return Err(Error::Config(format!(
                "rest must be {}-{} seconds, got {}",
                MIN_REST_SECONDS, MAX_REST_SECONDS, self.rest_seconds
            )));
        }
        Ok(())
    }

    pub fn constraints(&self) -> PlanConstraints {
        PlanConstraints::new(
            self.muscle_groups.iter().copied(),
            self.difficulty,
            self.location,
            self.duration_minutes.saturating_mul(60),
            self.rest_seconds,
        )
    }
}

impl fmt::Display for PlanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<&str> = self.muscle_groups.iter().map(|g| g.as_str()).collect();
        write!(
            f,
            "{} / {} / {} / {}, {}s rest",
            if groups.is_empty() { "-".to_string() } else { groups.join(",") },
            self.difficulty,
            self.location,
            format_minutes(self.duration_minutes),
            self.rest_seconds
        )
    }
}

/// Comma-separated muscle groups, unknown tokens dropped
pub fn parse_muscle_list(raw: &str) -> Vec<MuscleGroup> {
    raw.split(',')
        .filter(|token| !token.trim().is_empty())
        .filter_map(|token| match token.parse::<MuscleGroup>() {
            Ok(group) => Some(group),
            Err(_) => {
                tracing::warn!("Ignoring unknown muscle group {:?}", token.trim());
                None
            }
        })
        .collect()
}

fn lenient<T: std::str::FromStr>(raw: &str, key: &str, fallback: T) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Malformed {} parameter {:?}, using default", key, raw);
            fallback
        }
    }
}
