//! MindMate CLI - Command-line interface for the MindMate analytics engine
//!
//! Commands:
//! - log: Append a journal entry to the entry file
//! - analyze: Derive dashboard analytics from the entry file
//! - report: Print the weekly wellness report
//! - validate: Check stored records for problems
//! - doctor: Diagnose configuration and storage health

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mindmate::config::{EngineConfig, CONFIG_ENV_VAR};
use mindmate::encoder::{SnapshotEncoder, SNAPSHOT_SCHEMA_VERSION};
use mindmate::engine::{parse_now, WellnessEngine};
use mindmate::error::{ConfigError, StoreError};
use mindmate::normalizer::{EntryNormalizer, IssueKind};
use mindmate::report::render_report;
use mindmate::sentiment::{classify, LexiconScorer};
use mindmate::store::{EntryStore, JsonFileStore, NewEntry};
use mindmate::types::{DerivedState, Habit, Mood};
use mindmate::{AnalyticsError, MINDMATE_VERSION, PRODUCER_NAME};

/// MindMate - On-device analytics for a wellness journal
#[derive(Parser)]
#[command(name = "mindmate")]
#[command(author = "MindMate Contributors")]
#[command(version = MINDMATE_VERSION)]
#[command(about = "Log journal entries and derive wellness analytics", long_about = None)]
struct Cli {
    /// Entry file (JSON array of stored records)
    #[arg(long, global = true, default_value = "mindmate-entries.json")]
    store: PathBuf,

    /// Engine configuration file (falls back to $MINDMATE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a journal entry
    Log {
        /// Mood from 1 (very sad) to 5 (amazing)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: u8,

        /// Hours slept
        #[arg(short, long, default_value = "8")]
        sleep: f64,

        /// Completed habit (repeatable), e.g. exercise, meditation, reading
        #[arg(long = "habit")]
        habits: Vec<String>,

        /// Free-text reflection
        #[arg(short, long, default_value = "")]
        reflection: String,

        /// Entry time (RFC 3339); defaults to now
        #[arg(long)]
        date: Option<String>,
    },

    /// Derive analytics from the entry file
    Analyze {
        /// Evaluation time (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<String>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Include a motivational prompt and weekly challenges
        #[arg(long)]
        dashboard: bool,

        /// Seed for the prompt and challenge picks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the weekly wellness report
    Report {
        /// Evaluation time (RFC 3339); defaults to now
        #[arg(long)]
        now: Option<String>,
    },

    /// Check stored records for problems
    Validate {
        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and storage health
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable summary
    Text,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn run(cli: Cli) -> Result<(), MindmateCliError> {
    let store = JsonFileStore::new(&cli.store);

    match cli.command {
        Commands::Log {
            mood,
            sleep,
            habits,
            reflection,
            date,
        } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_log(&store, &config, mood, sleep, &habits, reflection, date.as_deref())
        }

        Commands::Analyze {
            now,
            format,
            dashboard,
            seed,
        } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_analyze(&store, config, now.as_deref(), format, dashboard, seed)
        }

        Commands::Report { now } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_report(&store, config, now.as_deref())
        }

        Commands::Validate { json } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_validate(&store, &config, json)
        }

        Commands::Doctor { json } => cmd_doctor(&store, cli.config.as_deref(), json),
    }
}

/// `--config` wins over the environment; neither means defaults
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
}

fn load_config(explicit: Option<&Path>) -> Result<EngineConfig, MindmateCliError> {
    match config_path(explicit) {
        Some(path) => {
            debug!(path = %path.display(), "loading engine config");
            Ok(EngineConfig::from_file(path)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>, MindmateCliError> {
    match now {
        Some(s) => Ok(parse_now(s)?),
        None => Ok(Utc::now()),
    }
}

fn cmd_log(
    store: &JsonFileStore,
    config: &EngineConfig,
    mood: u8,
    sleep: f64,
    habits: &[String],
    reflection: String,
    date: Option<&str>,
) -> Result<(), MindmateCliError> {
    let mood = Mood::from_level(i64::from(mood)).ok_or(MindmateCliError::InvalidMood(mood))?;

    let mut parsed = Vec::with_capacity(habits.len());
    for key in habits {
        let habit = Habit::from_key(key).ok_or_else(|| MindmateCliError::UnknownHabit(key.clone()))?;
        if !config.catalog.contains(habit) {
            return Err(MindmateCliError::UntrackedHabit(habit));
        }
        parsed.push(habit);
    }

    let entry = NewEntry::new(mood, resolve_now(date)?)
        .sleep_hours(sleep)
        .habits(parsed)
        .reflection(reflection);
    let record = entry.to_record_encoded(config.mood_encoding);
    let id = record["id"].as_str().unwrap_or_default().to_string();

    store.append(record)?;
    println!("Logged entry {} ({})", id, mood.label());
    Ok(())
}

fn cmd_analyze(
    store: &JsonFileStore,
    config: EngineConfig,
    now: Option<&str>,
    format: OutputFormat,
    dashboard: bool,
    seed: Option<u64>,
) -> Result<(), MindmateCliError> {
    let now = resolve_now(now)?;
    let engine = WellnessEngine::new(config);
    let records = store.load()?;
    let derived = engine.derive(&records, now, Some(&LexiconScorer::new()));

    if dashboard {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dashboard = engine.dashboard(derived, &mut rng);
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&dashboard)?),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&dashboard)?),
            OutputFormat::Text => {
                print_summary(&dashboard.derived);
                println!("\n{}", dashboard.motivational_prompt);
                println!("\nWeekly challenges:");
                for challenge in &dashboard.weekly_challenges {
                    println!("  - {challenge}");
                }
            }
        }
        return Ok(());
    }

    let encoder = SnapshotEncoder::new();
    match format {
        OutputFormat::Json => println!("{}", encoder.encode_to_json_compact(&derived)?),
        OutputFormat::JsonPretty => println!("{}", encoder.encode_to_json(&derived)?),
        OutputFormat::Text => print_summary(&derived),
    }
    Ok(())
}

fn print_summary(derived: &DerivedState) {
    println!("MindMate Summary");
    println!("================");
    println!("Entries:          {}", derived.total_entries);
    println!("Level:            {}", derived.level);
    println!("Current streak:   {} day(s)", derived.streak);
    println!("Habit streak:     {} perfect day(s)", derived.habit_best_streak);
    println!(
        "This week:        mood {:.2}, sleep {:.1}h, habits {}%",
        derived.weekly.avg_mood, derived.weekly.avg_sleep_hours, derived.weekly.habit_completion_percent
    );
    println!(
        "This month:       mood {:.2}, sleep {:.1}h, habits {}%",
        derived.monthly.avg_mood, derived.monthly.avg_sleep_hours, derived.monthly.habit_completion_percent
    );
    println!("Monthly progress: {}%", derived.monthly_progress_percent);
    println!(
        "Reflection:       {} ({})",
        classify(derived.reflection_sentiment).as_str(),
        derived.reflection_sentiment
    );

    if !derived.badges.is_empty() {
        let labels: Vec<&str> = derived.badges.iter().map(|b| b.label()).collect();
        println!("Badges:           {}", labels.join(", "));
    }

    println!("\nCoach: {}", derived.coaching_tip.message);
    if !derived.wellness_tips.is_empty() {
        println!("\nTips:");
        for tip in &derived.wellness_tips {
            println!("  - {tip}");
        }
    }
}

fn cmd_report(
    store: &JsonFileStore,
    config: EngineConfig,
    now: Option<&str>,
) -> Result<(), MindmateCliError> {
    let now = resolve_now(now)?;
    let records = store.load()?;
    let derived = WellnessEngine::new(config).derive(&records, now, Some(&LexiconScorer::new()));
    println!("{}", render_report(&derived));
    Ok(())
}

fn cmd_validate(store: &JsonFileStore, config: &EngineConfig, json: bool) -> Result<(), MindmateCliError> {
    let records = store.load()?;
    let issues = EntryNormalizer::new(config).validate(&records);
    let dropped = issues.iter().filter(|i| i.kind == IssueKind::Dropped).count();

    let report = ValidationReport {
        total_records: records.len(),
        usable_records: records.len() - dropped,
        dropped_records: dropped,
        issues: issues
            .iter()
            .map(|issue| ValidationIssueDetail {
                index: issue.index,
                id: records
                    .get(issue.index)
                    .and_then(|r| r.get("id"))
                    .map(|id| match id {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    }),
                kind: issue.kind.clone(),
                message: issue.message.clone(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Usable records:  {}", report.usable_records);
        println!("Dropped records: {}", report.dropped_records);

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                println!(
                    "  - Record {} (index {}): {}",
                    issue.id.as_deref().unwrap_or("unknown"),
                    issue.index,
                    issue.message
                );
            }
        }
    }

    if report.issues.is_empty() {
        Ok(())
    } else {
        Err(MindmateCliError::ValidationFailed(report.issues.len()))
    }
}

fn cmd_doctor(store: &JsonFileStore, config: Option<&Path>, json: bool) -> Result<(), MindmateCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "mindmate_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("MindMate version {}", MINDMATE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Snapshot schema: {}", SNAPSHOT_SCHEMA_VERSION),
    });

    // Config
    let config_check = match config_path(config) {
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "No config file, using defaults".to_string(),
        },
        Some(path) => match EngineConfig::from_file(&path) {
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid ({} tracked habits, UTC offset {} min)",
                    config.catalog.len(),
                    config.utc_offset_minutes
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("{}: {}", path.display(), e),
            },
        },
    };
    checks.push(config_check);

    // Entry file
    let store_check = if !store.path().exists() {
        DoctorCheck {
            name: "store".to_string(),
            status: CheckStatus::Warning,
            message: format!("{} does not exist yet", store.path().display()),
        }
    } else {
        match store.load() {
            Ok(records) => DoctorCheck {
                name: "store".to_string(),
                status: CheckStatus::Ok,
                message: format!("Entry file valid ({} records)", records.len()),
            },
            Err(e) => DoctorCheck {
                name: "store".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot use entry file: {}", e),
            },
        }
    };
    checks.push(store_check);

    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (text output reads best)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (JSON output recommended)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MINDMATE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("MindMate Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MindmateCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum MindmateCliError {
    Json(serde_json::Error),
    Analytics(AnalyticsError),
    Store(StoreError),
    Config(ConfigError),
    InvalidMood(u8),
    UnknownHabit(String),
    UntrackedHabit(Habit),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<serde_json::Error> for MindmateCliError {
    fn from(e: serde_json::Error) -> Self {
        MindmateCliError::Json(e)
    }
}

impl From<AnalyticsError> for MindmateCliError {
    fn from(e: AnalyticsError) -> Self {
        MindmateCliError::Analytics(e)
    }
}

impl From<StoreError> for MindmateCliError {
    fn from(e: StoreError) -> Self {
        MindmateCliError::Store(e)
    }
}

impl From<ConfigError> for MindmateCliError {
    fn from(e: ConfigError) -> Self {
        MindmateCliError::Config(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MindmateCliError> for CliError {
    fn from(e: MindmateCliError) -> Self {
        match e {
            MindmateCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            MindmateCliError::Analytics(AnalyticsError::DateParseError(msg)) => CliError {
                code: "DATE_ERROR".to_string(),
                message: msg,
                hint: Some("Use RFC 3339, e.g. 2025-07-20T18:00:00Z".to_string()),
            },
            MindmateCliError::Analytics(e) => CliError {
                code: "ANALYTICS_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            MindmateCliError::Store(e) => CliError {
                code: "STORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'mindmate doctor' to check the entry file".to_string()),
            },
            MindmateCliError::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Check --config or ${}", CONFIG_ENV_VAR)),
            },
            MindmateCliError::InvalidMood(mood) => CliError {
                code: "INVALID_MOOD".to_string(),
                message: format!("Mood {} is outside 1-5", mood),
                hint: None,
            },
            MindmateCliError::UnknownHabit(key) => CliError {
                code: "UNKNOWN_HABIT".to_string(),
                message: format!("Unknown habit '{}'", key),
                hint: Some(format!(
                    "Known habits: {}",
                    Habit::ALL.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(", ")
                )),
            },
            MindmateCliError::UntrackedHabit(habit) => CliError {
                code: "UNTRACKED_HABIT".to_string(),
                message: format!("Habit '{}' is not in the tracked catalog", habit.as_str()),
                hint: Some("Add it to the catalog in the engine config".to_string()),
            },
            MindmateCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} issues found in stored records", count),
                hint: Some("Dropped records are ignored by analytics".to_string()),
            },
            MindmateCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    usable_records: usize,
    dropped_records: usize,
    issues: Vec<ValidationIssueDetail>,
}

#[derive(serde::Serialize)]
struct ValidationIssueDetail {
    index: usize,
    id: Option<String>,
    kind: IssueKind,
    message: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
