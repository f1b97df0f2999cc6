//! Post-workout feedback and summary figures.

use crate::{Error, Result, WorkoutSession};

/// Validated user feedback for a finished session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionFeedback {
    rating: u8,
    notes: Option<String>,
}

impl SessionFeedback {
    /// `rating` must be 1..=5; blank notes are dropped
    pub fn new(rating: u8, notes: Option<&str>) -> Result<Self> {
        if !(1..=5).contains(&rating) {
            return Err(Error::InvalidRating(rating));
        }
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        Ok(Self { rating, notes })
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Display label for a difficulty rating
pub fn rating_label(rating: u8) -> &'static str {
    match rating {
        1 => "Too Easy",
        2 => "Easy",
        3 => "Just Right",
        4 => "Challenging",
        5 => "Too Hard",
        _ => "Unrated",
    }
}

impl WorkoutSession {
    /// Attach feedback; the caller re-saves the session afterwards
    pub fn finalize(&mut self, feedback: SessionFeedback) {
        self.user_difficulty_rating = Some(feedback.rating);
        self.notes = feedback.notes;
    }
}

/// Figures shown on the completion screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionSummary {
    pub completed_count: usize,
    pub total_count: usize,
    /// Rounded percentage, 0 for an empty plan
    pub completion_rate: u32,
    /// Elapsed time when known, otherwise the plan estimate, rounded
    pub minutes: u32,
}

impl CompletionSummary {
    pub fn of(session: &WorkoutSession) -> Self {
        let completed_count = session.completed_exercises.len();
        let total_count = session.plan.exercises.len();
        let completion_rate = if total_count == 0 {
            0
        } else {
            ((completed_count as f64 / total_count as f64) * 100.0).round() as u32
        };
        let seconds = session
            .elapsed_seconds
            .unwrap_or(session.plan.total_duration_seconds);
        let minutes = (seconds as f64 / 60.0).round() as u32;

        Self {
            completed_count,
            total_count,
            completion_rate,
            minutes,
        }
    }
}
