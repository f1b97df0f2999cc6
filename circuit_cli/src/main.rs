use chrono::Utc;
use circuit_core::completion::rating_label;
use circuit_core::params::{find_preset, format_minutes, parse_muscle_list};
use circuit_core::*;
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

const DEFAULT_USER: &str = "local";

#[derive(Parser)]
#[command(name = "circuit")]
#[command(about = "Workout plan builder and interval timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Plan selection flags, parsed leniently like navigation parameters
#[derive(Args, Debug, Clone)]
struct PlanArgs {
    /// Muscle groups, comma separated (chest, back, shoulders, arms, legs, core, full-body)
    #[arg(long)]
    muscles: Option<String>,

    /// beginner, intermediate or advanced
    #[arg(long)]
    difficulty: Option<String>,

    /// home, gym, outdoor or office
    #[arg(long)]
    location: Option<String>,

    /// Target duration in minutes
    #[arg(long)]
    duration: Option<String>,

    /// Rest between exercises in seconds
    #[arg(long)]
    rest: Option<String>,

    /// Named preset; overrides duration and rest
    #[arg(long)]
    preset: Option<String>,

    /// Shuffle seed for a reproducible plan
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and print a workout plan
    Plan {
        #[command(flatten)]
        plan: PlanArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a plan and run the workout timer
    Start {
        #[command(flatten)]
        plan: PlanArgs,

        /// Start from saved preferences
        #[arg(long)]
        quick: bool,

        /// User the session is recorded for
        #[arg(long)]
        user: Option<String>,

        /// Auto-complete (for testing) - mark every exercise done
        #[arg(long, conflicts_with_all = ["auto_skip", "auto_run"])]
        auto_complete: bool,

        /// Auto-skip (for testing) - skip every exercise
        #[arg(long, conflicts_with_all = ["auto_complete", "auto_run"])]
        auto_skip: bool,

        /// Run the timer unattended until it completes
        #[arg(long, conflicts_with_all = ["auto_complete", "auto_skip"])]
        auto_run: bool,

        /// Length of one timer second in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Difficulty rating 1-5 recorded with the session
        #[arg(long)]
        rating: Option<u8>,

        /// Notes recorded with the session
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show recent workouts
    History {
        /// Number of sessions to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Only show sessions for this user
        #[arg(long)]
        user: Option<String>,
    },

    /// Export all sessions to CSV
    Export {
        /// Destination file
        path: PathBuf,
    },

    /// Show or update saved preferences
    Prefs {
        #[arg(long)]
        user: Option<String>,

        /// Preferred muscle groups, comma separated
        #[arg(long)]
        muscles: Option<String>,

        #[arg(long)]
        difficulty: Option<DifficultyLevel>,

        #[arg(long)]
        location: Option<WorkoutLocation>,

        /// Default rest in seconds
        #[arg(long)]
        rest: Option<u32>,
    },

    /// List duration presets
    Presets,
}

enum RunMode {
    Interactive,
    AutoComplete,
    AutoSkip,
    AutoRun,
}

fn main() -> Result<()> {
    // Initialize logging
    circuit_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    config.validate()?;

    match cli.command {
        Commands::Plan { plan, json } => cmd_plan(&config, &plan, json),
        Commands::Start {
            plan,
            quick,
            user,
            auto_complete,
            auto_skip,
            auto_run,
            tick_ms,
            rating,
            notes,
        } => {
            let mode = if auto_complete {
                RunMode::AutoComplete
            } else if auto_skip {
                RunMode::AutoSkip
            } else if auto_run {
                RunMode::AutoRun
            } else {
                RunMode::Interactive
            };
            let period = match tick_ms {
                Some(ms) if ms > 0 => Duration::from_millis(ms),
                Some(_) => return Err(Error::Config("--tick-ms must be positive".into())),
                None => config.timer.tick_period(),
            };
            cmd_start(
                &config,
                &plan,
                quick,
                user.unwrap_or_else(|| DEFAULT_USER.to_string()),
                mode,
                period,
                rating,
                notes,
            )
        }
        Commands::History { limit, user } => cmd_history(&config, limit, user),
        Commands::Export { path } => cmd_export(&config, path),
        Commands::Prefs {
            user,
            muscles,
            difficulty,
            location,
            rest,
        } => cmd_prefs(&config, user, muscles, difficulty, location, rest),
        Commands::Presets => cmd_presets(),
    }
}

fn cmd_plan(config: &Config, args: &PlanArgs, json: bool) -> Result<()> {
    let catalog = config.catalog()?;
    let request = resolve_request(args, config_request(config))?;
    let plan = generate_plan(&request, &catalog, args.seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        display_plan(&request, &plan, &catalog);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_start(
    config: &Config,
    args: &PlanArgs,
    quick: bool,
    user_id: String,
    mode: RunMode,
    period: Duration,
    rating: Option<u8>,
    notes: Option<String>,
) -> Result<()> {
    // Reject bad feedback before the workout, not after it
    let feedback = rating
        .map(|r| SessionFeedback::new(r, notes.as_deref()))
        .transpose()?;

    let catalog = config.catalog()?;
    let mut prefs_store = JsonPreferencesStore::new(config.preferences_path());
    let stored = prefs_store.get()?;
    let first_time = stored.is_none();

    let base = match (&stored, quick) {
        (Some(prefs), true) => PlanRequest::from_preferences(prefs),
        (None, true) => {
            println!("No saved preferences yet, using defaults.");
            config_request(config)
        }
        _ => config_request(config),
    };
    let request = resolve_request(args, base)?;
    let plan = generate_plan(&request, &catalog, args.seed);
    display_plan(&request, &plan, &catalog);

    if plan.is_empty() {
        println!("Nothing to time. Try different selections.");
        return Ok(());
    }

    let mut timer = WorkoutTimer::new(WorkoutSession::start(
        plan,
        Some(user_id.clone()),
        Utc::now(),
    ));

    let interactive = matches!(mode, RunMode::Interactive);
    timer = match mode {
        RunMode::AutoComplete => {
            while !timer.is_completed() {
                timer.complete_current();
            }
            timer
        }
        RunMode::AutoSkip => {
            while !timer.is_completed() {
                timer.skip();
            }
            timer
        }
        RunMode::AutoRun => run_unattended(timer, period)?,
        RunMode::Interactive => match run_interactive(timer, period, &catalog)? {
            Some(timer) => timer,
            None => {
                println!("\nWorkout abandoned - nothing saved.");
                return Ok(());
            }
        },
    };

    let mut sessions = JsonlSessionStore::new(config.sessions_path());
    let Some(mut session) = timer.finish(&mut sessions) else {
        return Ok(());
    };

    let feedback = match feedback {
        Some(feedback) => Some(feedback),
        None if interactive => prompt_feedback()?,
        None => None,
    };
    if let Some(feedback) = feedback {
        session.finalize(feedback);
        if let Err(e) = sessions.save(&session) {
            tracing::warn!("Failed to save feedback for {}: {}", session.id, e);
        }
    }

    display_summary(&session);

    let now = Utc::now();
    let updated = prefs_store.update(
        || {
            let mut prefs = UserPreferences::new(&user_id, now);
            prefs.preferred_muscle_groups = request.muscle_groups.clone();
            prefs.preferred_difficulty = request.difficulty;
            prefs.preferred_location = request.location;
            prefs.default_rest_time = request.rest_seconds;
            prefs
        },
        |prefs| {
            prefs.record_workout(session.id, now);
            Ok(())
        },
    );
    match updated {
        Ok(_) if first_time => println!("✓ Preferences saved from your first workout"),
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to update preferences: {}", e),
    }

    Ok(())
}

fn cmd_history(config: &Config, limit: usize, user: Option<String>) -> Result<()> {
    let store = JsonlSessionStore::new(config.sessions_path());
    let sessions = match user {
        Some(user) => {
            let all = store.list_all()?;
            let mine: Vec<WorkoutSession> =
                sessions_for_user(&all, &user).into_iter().cloned().collect();
            recent_sessions(&mine, limit).into_iter().cloned().collect()
        }
        None => load_recent_sessions(&store, limit)?,
    };

    if sessions.is_empty() {
        println!("No workouts recorded yet.");
        return Ok(());
    }

    for session in &sessions {
        let summary = CompletionSummary::of(session);
        let groups: Vec<&str> = session
            .plan
            .constraints
            .muscle_groups
            .iter()
            .map(|g| g.as_str())
            .collect();
        let rating = session
            .user_difficulty_rating
            .map(|r| format!("  {}", rating_label(r)))
            .unwrap_or_default();
        println!(
            "{}  {:<20} {}/{} exercises  {} min{}",
            session.created_at.format("%Y-%m-%d %H:%M"),
            groups.join(","),
            summary.completed_count,
            summary.total_count,
            summary.minutes,
            rating
        );
    }
    Ok(())
}

fn cmd_export(config: &Config, path: PathBuf) -> Result<()> {
    let store = JsonlSessionStore::new(config.sessions_path());
    let sessions = store.list_all()?;
    let count = export_sessions_csv(&sessions, &path)?;

    println!("✓ Exported {} sessions to CSV", count);
    println!("  CSV: {}", path.display());
    Ok(())
}

fn cmd_prefs(
    config: &Config,
    user: Option<String>,
    muscles: Option<String>,
    difficulty: Option<DifficultyLevel>,
    location: Option<WorkoutLocation>,
    rest: Option<u32>,
) -> Result<()> {
    let mut store = JsonPreferencesStore::new(config.preferences_path());

    let changing = user.is_some()
        || muscles.is_some()
        || difficulty.is_some()
        || location.is_some()
        || rest.is_some();
    if changing {
        let now = Utc::now();
        let user_id = user.clone().unwrap_or_else(|| DEFAULT_USER.to_string());
        store.update(
            || UserPreferences::new(user_id, now),
            |prefs| {
                if let Some(user) = user {
                    prefs.user_id = user;
                }
                if let Some(muscles) = muscles {
                    prefs.preferred_muscle_groups = parse_muscle_list(&muscles);
                }
                if let Some(difficulty) = difficulty {
                    prefs.preferred_difficulty = difficulty;
                }
                if let Some(location) = location {
                    prefs.preferred_location = location;
                }
                if let Some(rest) = rest {
                    let check = PlanRequest {
                        rest_seconds: rest,
                        ..PlanRequest::default()
                    };
                    check.validate()?;
                    prefs.default_rest_time = rest;
                }
                prefs.updated_at = now;
                Ok(())
            },
        )?;
        println!("✓ Preferences updated");
    }

    match store.get()? {
        None => println!("No preferences saved yet. Finish a workout to create them."),
        Some(prefs) => {
            let groups: Vec<&str> = prefs
                .preferred_muscle_groups
                .iter()
                .map(|g| g.as_str())
                .collect();
            println!("User:        {}", prefs.user_id);
            println!(
                "Muscles:     {}",
                if groups.is_empty() { "full-body".to_string() } else { groups.join(",") }
            );
            println!("Difficulty:  {}", prefs.preferred_difficulty);
            println!("Location:    {}", prefs.preferred_location);
            println!("Rest:        {}s", prefs.default_rest_time);
            println!("Workouts:    {}", prefs.workout_history.len());
        }
    }
    Ok(())
}

fn cmd_presets() -> Result<()> {
    for preset in &DURATION_PRESETS {
        println!(
            "{:<10} {:>8}  {}s rest",
            preset.name,
            format_minutes(preset.duration_minutes),
            preset.rest_seconds
        );
    }
    Ok(())
}

/// Workout defaults from the config file
fn config_request(config: &Config) -> PlanRequest {
    let workout = &config.workout;
    PlanRequest {
        muscle_groups: workout.muscle_groups.clone(),
        difficulty: workout.difficulty,
        location: workout.location,
        duration_minutes: workout.duration_minutes,
        rest_seconds: workout.rest_seconds,
    }
}

/// Layer command-line flags over `base`, then range-check the result
fn resolve_request(args: &PlanArgs, base: PlanRequest) -> Result<PlanRequest> {
    let groups: Vec<&str> = base.muscle_groups.iter().map(|g| g.as_str()).collect();
    let mut params: HashMap<String, String> = HashMap::new();
    params.insert("muscles".into(), groups.join(","));
    params.insert("difficulty".into(), base.difficulty.to_string());
    params.insert("location".into(), base.location.to_string());
    params.insert("duration".into(), base.duration_minutes.to_string());
    params.insert("restTime".into(), base.rest_seconds.to_string());

    let overrides = [
        ("muscles", &args.muscles),
        ("difficulty", &args.difficulty),
        ("location", &args.location),
        ("duration", &args.duration),
        ("restTime", &args.rest),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            params.insert(key.to_string(), value.clone());
        }
    }

    let mut request = PlanRequest::from_params(&params);
    if let Some(name) = &args.preset {
        let preset = find_preset(name)
            .ok_or_else(|| Error::Config(format!("Unknown preset: {}", name)))?;
        request = request.with_preset(preset);
    }

    request.validate()?;
    Ok(request)
}

fn generate_plan(request: &PlanRequest, catalog: &Catalog, seed: Option<u64>) -> WorkoutPlan {
    let constraints = request.constraints();
    match seed {
        Some(seed) => build_plan(&constraints, catalog, &mut RngShuffler::seeded(seed)),
        None => build_plan(&constraints, catalog, &mut RngShuffler::from_entropy()),
    }
}

fn exercise_name<'a>(catalog: &'a Catalog, id: &'a str) -> &'a str {
    catalog
        .query_by_id(id)
        .map(|e| e.name.as_str())
        .unwrap_or(id)
}

fn display_plan(request: &PlanRequest, plan: &WorkoutPlan, catalog: &Catalog) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT PLAN");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", request);
    println!();

    if plan.is_empty() {
        println!("  No exercises match these selections.");
        println!();
        return;
    }

    let last = plan.len() - 1;
    for (i, entry) in plan.exercises.iter().enumerate() {
        let rest = if i == last {
            String::new()
        } else {
            format!(" + {} rest", format_clock(entry.rest_seconds))
        };
        println!(
            "  {:>2}. {:<20} {}{}",
            entry.order,
            exercise_name(catalog, &entry.exercise_id),
            format_clock(entry.duration_seconds),
            rest
        );
        if let (Some(sets), Some(reps)) = (entry.sets, entry.reps) {
            println!("      → {} x {} reps", sets, reps);
        }
    }

    println!();
    println!(
        "  Total: {} ({} exercises)",
        format_clock(plan.total_duration_seconds),
        plan.len()
    );
    println!();
}

fn display_summary(session: &WorkoutSession) {
    let summary = CompletionSummary::of(session);
    println!("\n✓ Workout complete!");
    println!(
        "  Exercises: {}/{} ({}%)",
        summary.completed_count, summary.total_count, summary.completion_rate
    );
    println!("  Time: {} min", summary.minutes);
    if let Some(rating) = session.user_difficulty_rating {
        println!("  Rating: {} ({})", rating, rating_label(rating));
    }
    if let Some(notes) = &session.notes {
        println!("  Notes: {}", notes);
    }
}

/// Drive the timer on its own until it completes
fn run_unattended(timer: WorkoutTimer, period: Duration) -> Result<WorkoutTimer> {
    let (done_tx, done_rx) = mpsc::channel();
    let driver = TimerDriver::spawn(timer, period, move |event| {
        if event.snapshot().phase == TimerPhase::Completed {
            let _ = done_tx.send(());
        }
    })?;

    driver.start_pause();
    let _ = done_rx.recv();
    driver.shutdown()
}

/// Drive the timer from stdin; `None` if the user quits early
fn run_interactive(
    timer: WorkoutTimer,
    period: Duration,
    catalog: &Catalog,
) -> Result<Option<WorkoutTimer>> {
    let names: Vec<String> = timer
        .session()
        .plan
        .exercises
        .iter()
        .map(|e| exercise_name(catalog, &e.exercise_id).to_string())
        .collect();

    println!("─────────────────────────────────────────");
    println!("Press Enter to start or pause");
    println!("  's' + Enter to skip");
    println!("  'c' + Enter to mark the exercise done");
    println!("  'q' + Enter to quit without saving");

    let mut shown: Option<(TimerPhase, usize)> = None;
    let driver = TimerDriver::spawn(timer, period, move |event| {
        let snapshot = event.snapshot();
        let key = (snapshot.phase, snapshot.index);
        let changed = shown != Some(key);
        let applied = matches!(event, TimerEvent::Applied(..));
        if changed || applied || snapshot.remaining_seconds % 10 == 0 {
            print_status(&snapshot, &names);
            shown = Some(key);
        }
    })?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if driver.snapshot().phase == TimerPhase::Completed {
            break;
        }
        match line.trim().to_lowercase().as_str() {
            "" => driver.start_pause(),
            "s" => driver.skip(),
            "c" => driver.complete_current(),
            "q" => {
                driver.shutdown()?;
                return Ok(None);
            }
            other => println!("Unknown command {:?}", other),
        }
    }

    let timer = driver.shutdown()?;
    Ok(timer.is_completed().then_some(timer))
}

fn print_status(snapshot: &TimerSnapshot, names: &[String]) {
    let paused = if snapshot.running { "" } else { "  [paused]" };
    let name = |i: usize| names.get(i).map(String::as_str).unwrap_or("?");
    match snapshot.phase {
        TimerPhase::Exercise => println!(
            "▶ {}/{} {:<20} {}{}",
            snapshot.index + 1,
            names.len(),
            name(snapshot.index),
            format_clock(snapshot.remaining_seconds),
            paused
        ),
        TimerPhase::Rest => println!(
            "  Rest {}  next: {}{}",
            format_clock(snapshot.remaining_seconds),
            name(snapshot.index + 1),
            paused
        ),
        TimerPhase::Completed => println!("✓ All exercises done. Press Enter to finish."),
    }
}

fn prompt_feedback() -> Result<Option<SessionFeedback>> {
    let stdin = io::stdin();
    loop {
        print!("Rate the difficulty 1-5 (Enter to skip): ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let rating = match input.parse::<u8>() {
            Ok(rating) if (1..=5).contains(&rating) => rating,
            _ => {
                println!("Please enter a number from 1 to 5.");
                continue;
            }
        };

        print!("Notes (optional): ");
        io::stdout().flush()?;
        let mut notes = String::new();
        stdin.lock().read_line(&mut notes)?;

        return SessionFeedback::new(rating, Some(&notes)).map(Some);
    }
}
