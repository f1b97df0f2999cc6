//! Curriculum builder: turns a constraint set into a workout plan.
//!
//! Selection rules:
//! - Union of catalog exercises for each requested muscle group
//! - Exact difficulty match only
//! - Home/office workouts only get equipment-free exercises
//! - Random order, then a single greedy pass that fills the time budget
//! - At most [`MAX_PLAN_EXERCISES`] entries

use crate::{
    Exercise, ExerciseCatalog, PlanConstraints, Shuffler, WorkoutExercise, WorkoutPlan,
};
use std::collections::HashSet;

/// Hard cap on plan length
pub const MAX_PLAN_EXERCISES: usize = 8;

/// Build a workout plan for the given constraints
///
/// Never fails: an unmatched muscle selection, an impossible time budget or
/// an empty catalog all produce an empty plan with zero total duration.
pub fn build_plan<C, S>(constraints: &PlanConstraints, catalog: &C, shuffler: &mut S) -> WorkoutPlan
where
    C: ExerciseCatalog + ?Sized,
    S: Shuffler,
{
    let mut candidates = select_candidates(constraints, catalog);

    tracing::debug!(
        "{} candidate exercises for {:?} / {} / {}",
        candidates.len(),
        constraints.muscle_groups,
        constraints.difficulty,
        constraints.location
    );

    shuffler.shuffle(&mut candidates);

    let accepted = pack_for_duration(
        &candidates,
        constraints.target_duration_seconds,
        constraints.rest_seconds,
    );

    let exercises: Vec<WorkoutExercise> = accepted
        .iter()
        .enumerate()
        .map(|(idx, exercise)| WorkoutExercise {
            exercise_id: exercise.id.clone(),
            order: idx as u32 + 1,
            duration_seconds: exercise.duration_seconds,
            rest_seconds: constraints.rest_seconds,
            sets: exercise.sets,
            reps: exercise.reps,
            completed: false,
        })
        .collect();

    let plan = WorkoutPlan {
        constraints: constraints.clone(),
        total_duration_seconds: total_duration(&exercises),
        exercises,
    };

    tracing::info!(
        "Built plan with {} exercises (~{}s, target {}s)",
        plan.exercises.len(),
        plan.total_duration_seconds,
        constraints.target_duration_seconds
    );

    plan
}

/// Filter the catalog down to exercises eligible for the constraints,
/// de-duplicated by id in first-seen order.
fn select_candidates<'a, C>(constraints: &PlanConstraints, catalog: &'a C) -> Vec<&'a Exercise>
where
    C: ExerciseCatalog + ?Sized,
{
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for group in &constraints.muscle_groups {
        for exercise in catalog.query_by_muscle_group(*group) {
            if exercise.difficulty != constraints.difficulty {
                continue;
            }
            if exercise.needs_equipment() && !constraints.location.allows_equipment() {
                continue;
            }
            if !seen.insert(exercise.id.as_str()) {
                continue;
            }
            // Entries must resolve by id or the timer could not display them later
            if catalog.query_by_id(&exercise.id).is_none() {
                tracing::warn!("Dropping unresolvable exercise '{}'", exercise.id);
                continue;
            }
            candidates.push(exercise);
        }
    }

    candidates
}

/// Single greedy pass over `candidates`.
///
/// A candidate that does not fit is skipped and the pass continues; earlier
/// rejects are never retried.
fn pack_for_duration<'a>(
    candidates: &[&'a Exercise],
    target_seconds: u32,
    rest_seconds: u32,
) -> Vec<&'a Exercise> {
    let mut selected = Vec::new();
    let mut running: u64 = 0;

    for exercise in candidates {
        let with_rest = u64::from(exercise.duration_seconds) + u64::from(rest_seconds);
        if running + with_rest <= u64::from(target_seconds) {
            selected.push(*exercise);
            running += with_rest;
        }

        if selected.len() >= MAX_PLAN_EXERCISES {
            break;
        }
    }

    selected
}

/// Sum of duration plus rest for every entry, without the rest after the last
pub fn total_duration(exercises: &[WorkoutExercise]) -> u32 {
    let sum: u32 = exercises
        .iter()
        .map(|e| e.duration_seconds + e.rest_seconds)
        .sum();
    let trailing_rest = exercises.last().map_or(0, |e| e.rest_seconds);
    sum - trailing_rest
}

/// Remove an entry from a plan by exercise id
///
/// Remaining entries are renumbered and the total is recomputed. Returns
/// `false` (leaving the plan untouched) when the id is not in the plan.
pub fn remove_exercise(plan: &mut WorkoutPlan, exercise_id: &str) -> bool {
    let before = plan.exercises.len();
    plan.exercises.retain(|e| e.exercise_id != exercise_id);
    if plan.exercises.len() == before {
        return false;
    }

    for (idx, entry) in plan.exercises.iter_mut().enumerate() {
        entry.order = idx as u32 + 1;
    }
    plan.total_duration_seconds = total_duration(&plan.exercises);

    tracing::debug!(
        "Removed '{}' from plan, {} exercises left",
        exercise_id,
        plan.exercises.len()
    );
    true
}

impl WorkoutPlan {
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Convenience wrapper around [`remove_exercise`]
    pub fn remove_exercise(&mut self, exercise_id: &str) -> bool {
        remove_exercise(self, exercise_id)
    }
}
