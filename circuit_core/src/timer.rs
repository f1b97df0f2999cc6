//! Exercise/rest countdown engine.
//!
//! The engine holds no clock of its own: something outside (see
//! [`crate::driver`]) calls [`WorkoutTimer::tick`] once per elapsed second
//! while the timer is running. Every operation is infallible; transitions
//! that make no sense in the current phase are ignored.
//!
//! Phase sequence for a plan of `n` entries:
//!
//! ```text
//! exercise(0) -> rest(0) -> exercise(1) -> ... -> exercise(n-1) -> completed
//! ```
//!
//! The rest after the final exercise is never timed.

use crate::{SessionStore, TimerPhase, WorkoutExercise, WorkoutSession};

/// Live state of one workout session
#[derive(Clone, Debug)]
pub struct WorkoutTimer {
    session: WorkoutSession,
    index: usize,
    phase: TimerPhase,
    remaining_seconds: u32,
    running: bool,
}

impl WorkoutTimer {
    /// Start at `exercise(0)`, paused
    ///
    /// An empty plan has nothing to time and starts out completed.
    pub fn new(mut session: WorkoutSession) -> Self {
        session.completed_exercises.clear();
        for entry in &mut session.plan.exercises {
            entry.completed = false;
        }

        let (phase, remaining_seconds) = match session.plan.exercises.first() {
            Some(first) => (TimerPhase::Exercise, first.duration_seconds),
            None => (TimerPhase::Completed, 0),
        };

        Self {
            session,
            index: 0,
            phase,
            remaining_seconds,
            running: false,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// The plan entry being timed, `None` once completed
    pub fn current_exercise(&self) -> Option<&WorkoutExercise> {
        if self.phase == TimerPhase::Completed {
            return None;
        }
        self.session.plan.exercises.get(self.index)
    }

    /// The entry that follows the current one, if any
    pub fn next_exercise(&self) -> Option<&WorkoutExercise> {
        if self.phase == TimerPhase::Completed {
            return None;
        }
        self.session.plan.exercises.get(self.index + 1)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_completed(&self) -> bool {
        self.phase == TimerPhase::Completed
    }

    pub fn completed_exercises(&self) -> &[String] {
        &self.session.completed_exercises
    }

    pub fn exercise_count(&self) -> usize {
        self.session.plan.exercises.len()
    }

    /// Share of the plan already left behind, 0-100
    pub fn progress_percent(&self) -> u32 {
        let total = self.exercise_count();
        if total == 0 || self.is_completed() {
            return 100;
        }
        (self.index * 100 / total) as u32
    }

    pub fn session(&self) -> &WorkoutSession {
        &self.session
    }

    /// Advance the clock by one second
    ///
    /// Ignored while paused or completed.
    pub fn tick(&mut self) {
        if !self.running || self.is_completed() {
            return;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.expire_phase();
        }
    }

    /// Toggle between running and paused
    ///
    /// Never changes phase, index or remaining time. A completed timer stays
    /// stopped.
    pub fn start_pause(&mut self) {
        if self.is_completed() {
            return;
        }
        self.running = !self.running;
        tracing::debug!(
            "Timer {} at {:?}({}) with {}s left",
            if self.running { "started" } else { "paused" },
            self.phase,
            self.index,
            self.remaining_seconds
        );
    }

    /// Move straight to the next exercise without crediting the current one
    pub fn skip(&mut self) {
        if self.is_completed() {
            return;
        }
        if let Some(entry) = self.session.plan.exercises.get(self.index) {
            tracing::info!("Skipped exercise '{}'", entry.exercise_id);
        }
        self.advance_to(self.index + 1);
    }

    /// Credit the current exercise, then move to the next one
    pub fn complete_current(&mut self) {
        if self.is_completed() {
            return;
        }

        if let Some(entry) = self.session.plan.exercises.get_mut(self.index) {
            entry.completed = true;
            let id = entry.exercise_id.clone();
            if !self.session.completed_exercises.contains(&id) {
                self.session.completed_exercises.push(id);
            }
            tracing::info!("Completed exercise '{}'", entry.exercise_id);
        }
        self.advance_to(self.index + 1);
    }

    /// Close out a completed workout and hand it to `store`
    ///
    /// Returns `None` (and does nothing) unless the timer is completed;
    /// callers are expected to offer "finish" only at that point. Skipped
    /// exercises do not block finishing. A failed save is logged and the
    /// finished session is still returned.
    pub fn finish<S>(&mut self, store: &mut S) -> Option<WorkoutSession>
    where
        S: SessionStore + ?Sized,
    {
        if !self.is_completed() {
            tracing::warn!("finish() called while timer is in {:?}", self.phase);
            return None;
        }

        let elapsed = self
            .session
            .plan
            .total_duration_seconds
            .saturating_sub(self.remaining_seconds);
        self.session.elapsed_seconds = Some(elapsed);

        if let Err(e) = store.save(&self.session) {
            tracing::warn!("Failed to save session {}: {}", self.session.id, e);
        } else {
            tracing::info!(
                "Saved session {} ({}/{} exercises, {}s)",
                self.session.id,
                self.session.completed_exercises.len(),
                self.exercise_count(),
                elapsed
            );
        }

        Some(self.session.clone())
    }

    fn expire_phase(&mut self) {
        match self.phase {
            TimerPhase::Exercise => {
                let last = self.index + 1 >= self.exercise_count();
                if last {
                    self.enter_completed();
                } else {
                    self.phase = TimerPhase::Rest;
                    self.remaining_seconds = self.session.plan.exercises[self.index].rest_seconds;
                }
            }
            TimerPhase::Rest => self.advance_to(self.index + 1),
            TimerPhase::Completed => {}
        }
    }

    /// Enter `exercise(next)`, or `completed` when the plan is exhausted
    fn advance_to(&mut self, next: usize) {
        match self.session.plan.exercises.get(next) {
            Some(entry) => {
                self.index = next;
                self.phase = TimerPhase::Exercise;
                self.remaining_seconds = entry.duration_seconds;
            }
            None => self.enter_completed(),
        }
    }

    /// Remaining time is left as-is so `finish` can discount unused seconds
    fn enter_completed(&mut self) {
        self.phase = TimerPhase::Completed;
        self.running = false;
        tracing::info!("Workout {} completed", self.session.id);
    }
}

/// Format seconds as `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DifficultyLevel, Error, MuscleGroup, PlanConstraints, Result, WorkoutLocation,
        WorkoutPlan,
    };
    use chrono::Utc;

    fn plan(entries: &[(u32, u32)]) -> WorkoutPlan {
        let exercises: Vec<WorkoutExercise> = entries
            .iter()
            .enumerate()
            .map(|(i, (duration, rest))| WorkoutExercise {
                exercise_id: format!("ex{}", i),
                order: i as u32 + 1,
                duration_seconds: *duration,
                rest_seconds: *rest,
                sets: None,
                reps: None,
                completed: false,
            })
            .collect();
        WorkoutPlan {
            constraints: PlanConstraints::new(
                [MuscleGroup::Core],
                DifficultyLevel::Beginner,
                WorkoutLocation::Home,
                3600,
                30,
            ),
            total_duration_seconds: crate::curriculum::total_duration(&exercises),
            exercises,
        }
    }

    fn timer(entries: &[(u32, u32)]) -> WorkoutTimer {
        WorkoutTimer::new(WorkoutSession::start(plan(entries), None, Utc::now()))
    }

    fn tick_n(timer: &mut WorkoutTimer, n: u32) {
        for _ in 0..n {
            timer.tick();
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Vec<WorkoutSession>,
    }

    impl SessionStore for RecordingStore {
        fn save(&mut self, session: &WorkoutSession) -> Result<()> {
            self.saved.push(session.clone());
            Ok(())
        }

        fn list_all(&self) -> Result<Vec<WorkoutSession>> {
            Ok(self.saved.clone())
        }
    }

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn save(&mut self, _session: &WorkoutSession) -> Result<()> {
            Err(Error::Store("disk full".into()))
        }

        fn list_all(&self) -> Result<Vec<WorkoutSession>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_initial_state() {
        let t = timer(&[(60, 30), (45, 45)]);
        assert_eq!(t.phase(), TimerPhase::Exercise);
        assert_eq!(t.current_index(), 0);
        assert_eq!(t.remaining_seconds(), 60);
        assert!(!t.is_running());
        assert!(t.completed_exercises().is_empty());
    }

    #[test]
    fn test_ticks_ignored_while_paused() {
        let mut t = timer(&[(10, 5)]);
        tick_n(&mut t, 5);
        assert_eq!(t.remaining_seconds(), 10);
    }

    #[test]
    fn test_exercise_expires_into_rest_exactly_on_time() {
        let mut t = timer(&[(10, 5), (8, 5)]);
        t.start_pause();

        tick_n(&mut t, 9);
        assert_eq!(t.phase(), TimerPhase::Exercise);
        assert_eq!(t.remaining_seconds(), 1);

        t.tick();
        assert_eq!(t.phase(), TimerPhase::Rest);
        assert_eq!(t.current_index(), 0);
        assert_eq!(t.remaining_seconds(), 5);
    }

    #[test]
    fn test_rest_expires_into_next_exercise() {
        let mut t = timer(&[(10, 5), (8, 5)]);
        t.start_pause();
        tick_n(&mut t, 15);

        assert_eq!(t.phase(), TimerPhase::Exercise);
        assert_eq!(t.current_index(), 1);
        assert_eq!(t.remaining_seconds(), 8);
        assert!(t.is_running());
    }

    #[test]
    fn test_single_entry_plan_skips_trailing_rest() {
        let mut t = timer(&[(10, 20)]);
        t.start_pause();
        tick_n(&mut t, 10);

        assert_eq!(t.phase(), TimerPhase::Completed);
        assert!(!t.is_running());
        assert_eq!(t.remaining_seconds(), 0);
    }

    #[test]
    fn test_full_run_reaches_completed_and_stops() {
        let mut t = timer(&[(3, 2), (4, 2), (5, 2)]);
        t.start_pause();
        tick_n(&mut t, 3 + 2 + 4 + 2 + 5);

        assert!(t.is_completed());
        assert!(!t.is_running());

        // Further ticks change nothing
        tick_n(&mut t, 10);
        assert!(t.is_completed());
        assert_eq!(t.remaining_seconds(), 0);
    }

    #[test]
    fn test_start_pause_only_toggles_running() {
        let mut t = timer(&[(10, 5), (8, 5)]);
        t.start_pause();
        tick_n(&mut t, 4);
        t.start_pause();

        assert!(!t.is_running());
        assert_eq!(t.phase(), TimerPhase::Exercise);
        assert_eq!(t.current_index(), 0);
        assert_eq!(t.remaining_seconds(), 6);
    }

    #[test]
    fn test_skip_strictly_advances() {
        let mut t = timer(&[(10, 5), (8, 5), (6, 5)]);

        t.skip();
        assert_eq!(t.current_index(), 1);
        assert_eq!(t.phase(), TimerPhase::Exercise);
        assert_eq!(t.remaining_seconds(), 8);

        t.skip();
        assert_eq!(t.current_index(), 2);

        t.skip();
        assert!(t.is_completed());
        assert!(t.completed_exercises().is_empty());
    }

    #[test]
    fn test_skip_from_rest_goes_to_next_exercise() {
        let mut t = timer(&[(2, 30), (8, 5)]);
        t.start_pause();
        tick_n(&mut t, 2);
        assert_eq!(t.phase(), TimerPhase::Rest);

        t.skip();
        assert_eq!(t.phase(), TimerPhase::Exercise);
        assert_eq!(t.current_index(), 1);
        assert_eq!(t.remaining_seconds(), 8);
    }

    #[test]
    fn test_skip_when_completed_is_noop() {
        let mut t = timer(&[(10, 5)]);
        t.skip();
        assert!(t.is_completed());
        t.skip();
        t.complete_current();
        assert!(t.is_completed());
        assert!(t.completed_exercises().is_empty());
    }

    #[test]
    fn test_complete_current_records_and_advances() {
        let mut t = timer(&[(10, 5), (8, 5)]);

        t.complete_current();
        assert_eq!(t.completed_exercises(), &["ex0".to_string()]);
        assert_eq!(t.current_index(), 1);
        assert!(t.session().plan.exercises[0].completed);
        assert!(!t.session().plan.exercises[1].completed);

        t.complete_current();
        assert!(t.is_completed());
        assert_eq!(t.completed_exercises().len(), 2);
    }

    #[test]
    fn test_complete_during_rest_credits_that_exercise() {
        let mut t = timer(&[(1, 30), (8, 5)]);
        t.start_pause();
        t.tick();
        assert_eq!(t.phase(), TimerPhase::Rest);

        t.complete_current();
        assert_eq!(t.completed_exercises(), &["ex0".to_string()]);
        assert_eq!(t.current_index(), 1);
    }

    #[test]
    fn test_empty_plan_starts_completed() {
        let mut t = timer(&[]);
        assert!(t.is_completed());
        assert!(t.current_exercise().is_none());
        t.start_pause();
        assert!(!t.is_running());
    }

    #[test]
    fn test_finish_rejected_before_completion() {
        let mut t = timer(&[(10, 5)]);
        let mut store = RecordingStore::default();
        assert!(t.finish(&mut store).is_none());
        assert!(store.saved.is_empty());
    }

    #[test]
    fn test_finish_after_full_run_records_elapsed() {
        let mut t = timer(&[(10, 5), (8, 5)]);
        t.start_pause();
        tick_n(&mut t, 10);
        t.complete_current();
        tick_n(&mut t, 8);
        assert!(t.is_completed());

        let mut store = RecordingStore::default();
        let session = t.finish(&mut store).unwrap();

        assert_eq!(session.elapsed_seconds, Some(23));
        assert_eq!(session.completed_exercises, vec!["ex0".to_string()]);
        assert_eq!(store.saved.len(), 1);
        assert_eq!(store.saved[0].id, session.id);
    }

    #[test]
    fn test_finish_discounts_unused_time_after_skip() {
        let mut t = timer(&[(10, 5), (8, 5)]);
        t.skip();
        t.start_pause();
        tick_n(&mut t, 3);
        t.skip();
        assert!(t.is_completed());
        assert_eq!(t.remaining_seconds(), 5);

        let session = t.finish(&mut RecordingStore::default()).unwrap();
        assert_eq!(session.elapsed_seconds, Some(23 - 5));
        assert!(session.completed_exercises.is_empty());
    }

    #[test]
    fn test_failed_save_does_not_block_finish() {
        let mut t = timer(&[(10, 5)]);
        t.complete_current();

        let session = t.finish(&mut FailingStore).unwrap();
        assert!(t.is_completed());
        assert_eq!(session.completed_exercises, vec!["ex0".to_string()]);
    }

    #[test]
    fn test_progress_percent() {
        let mut t = timer(&[(10, 5), (8, 5), (6, 5), (4, 5)]);
        assert_eq!(t.progress_percent(), 0);
        t.skip();
        assert_eq!(t.progress_percent(), 25);
        t.skip();
        t.skip();
        t.skip();
        assert_eq!(t.progress_percent(), 100);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(600), "10:00");
    }
}
