#![forbid(unsafe_code)]

//! Core domain model and business logic for the Circuit workout system.
//!
//! This crate provides:
//! - Domain types (muscle groups, exercises, plans, sessions, preferences)
//! - Exercise catalog
//! - Curriculum builder
//! - Workout timer engine and its wall-clock driver
//! - Persistence (JSONL sessions, JSON preferences, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod shuffle;
pub mod curriculum;
pub mod timer;
pub mod driver;
pub mod store;
pub mod preferences;
pub mod params;
pub mod completion;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog, ExerciseCatalog};
pub use config::Config;
pub use shuffle::{KeepOrder, RngShuffler, Shuffler};
pub use curriculum::{build_plan, remove_exercise, total_duration, MAX_PLAN_EXERCISES};
pub use timer::{format_clock, WorkoutTimer};
pub use driver::{TimerCommand, TimerDriver, TimerEvent, TimerSnapshot};
pub use store::{JsonlSessionStore, SessionStore};
pub use preferences::{JsonPreferencesStore, PreferencesStore};
pub use params::{PlanRequest, DURATION_PRESETS};
pub use completion::{CompletionSummary, SessionFeedback};
pub use history::{load_recent_sessions, recent_sessions, sessions_for_user};
pub use export::export_sessions_csv;
