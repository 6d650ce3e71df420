//! MindMate - On-device analytics engine for a wellness journal
//!
//! MindMate turns the stored list of daily journal entries into dashboard state
//! through a deterministic pipeline: normalization → streaks → windowed rollups
//! → reflection sentiment → heuristic derivation → snapshot encoding.
//!
//! ## Modules
//!
//! - **Engine**: Derive streaks, rollups, level, badges and coaching from entries
//! - **Store**: Load and append entry records (in memory or a JSON file)
//! - **Report**: Render the weekly wellness report text

pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod normalizer;
pub mod prompts;
pub mod report;
pub mod rollups;
pub mod sentiment;
pub mod store;
pub mod streaks;
pub mod types;

// FFI bindings for C interop (on by default for cdylib/staticlib builds)
#[cfg(feature = "ffi")]
pub mod ffi;

pub use config::EngineConfig;
pub use encoder::SnapshotEncoder;
pub use engine::{entries_to_report, entries_to_snapshot, WellnessEngine};
pub use error::{AnalyticsError, ConfigError, SentimentError, StoreError};
pub use report::render_report;
pub use sentiment::{LexiconScorer, SentimentScorer};
pub use store::{EntryStore, JsonFileStore, MemoryStore, NewEntry};
pub use types::{Dashboard, DerivedState, Entry, Habit, HabitCatalog, Mood};

/// MindMate version embedded in all snapshots
pub const MINDMATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshots
pub const PRODUCER_NAME: &str = "mindmate-core";
