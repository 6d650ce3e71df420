//! Core types for the MindMate analytics engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: validated journal entries, windowed rollups, streaks, gamification
//! signals and the derived state handed back to the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Self-reported mood, canonical 1..=5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VerySad = 1,
    Sad = 2,
    Okay = 3,
    Good = 4,
    Amazing = 5,
}

impl Mood {
    /// Map a 1-based level to a mood
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Mood::VerySad),
            2 => Some(Mood::Sad),
            3 => Some(Mood::Okay),
            4 => Some(Mood::Good),
            5 => Some(Mood::Amazing),
            _ => None,
        }
    }

    /// Map a 0-based index (as used by some selectors) to a mood
    pub fn from_index(index: i64) -> Option<Self> {
        Self::from_level(index + 1)
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::VerySad => "Very Sad",
            Mood::Sad => "Sad",
            Mood::Okay => "Okay",
            Mood::Good => "Good",
            Mood::Amazing => "Amazing",
        }
    }
}

/// Trackable habit identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Habit {
    Exercise,
    Meditation,
    Reading,
    Hydration,
    SleepEarly,
    Gratitude,
    Music,
}

impl Habit {
    pub const ALL: [Habit; 7] = [
        Habit::Exercise,
        Habit::Meditation,
        Habit::Reading,
        Habit::Hydration,
        Habit::SleepEarly,
        Habit::Gratitude,
        Habit::Music,
    ];

    /// Resolve a stored habit key, accepting the legacy aliases
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "exercise" => Some(Habit::Exercise),
            "meditation" => Some(Habit::Meditation),
            "read" | "reading" => Some(Habit::Reading),
            "water" | "hydration" => Some(Habit::Hydration),
            "sleep_early" => Some(Habit::SleepEarly),
            "gratitude" => Some(Habit::Gratitude),
            "music" => Some(Habit::Music),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Habit::Exercise => "exercise",
            Habit::Meditation => "meditation",
            Habit::Reading => "reading",
            Habit::Hydration => "hydration",
            Habit::SleepEarly => "sleep_early",
            Habit::Gratitude => "gratitude",
            Habit::Music => "music",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Habit::Exercise => "Exercise",
            Habit::Meditation => "Meditation",
            Habit::Reading => "Reading",
            Habit::Hydration => "Hydration",
            Habit::SleepEarly => "Sleep Early",
            Habit::Gratitude => "Gratitude",
            Habit::Music => "Music",
        }
    }
}

impl fmt::Display for Habit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The tracked subset of habits.
///
/// Its size is the denominator of every completion percentage, and an entry
/// covering all of it is a "perfect day".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Habit>", into = "Vec<Habit>")]
pub struct HabitCatalog(Vec<Habit>);

impl From<Vec<Habit>> for HabitCatalog {
    fn from(habits: Vec<Habit>) -> Self {
        Self::new(habits)
    }
}

impl From<HabitCatalog> for Vec<Habit> {
    fn from(catalog: HabitCatalog) -> Self {
        catalog.0
    }
}

impl Default for HabitCatalog {
    fn default() -> Self {
        Self(vec![
            Habit::Exercise,
            Habit::Meditation,
            Habit::Reading,
            Habit::Hydration,
            Habit::SleepEarly,
        ])
    }
}

impl HabitCatalog {
    /// Build a catalog, dropping duplicates but keeping first-seen order
    pub fn new(habits: impl IntoIterator<Item = Habit>) -> Self {
        let mut seen = BTreeSet::new();
        Self(habits.into_iter().filter(|h| seen.insert(*h)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, habit: Habit) -> bool {
        self.0.contains(&habit)
    }

    pub fn iter(&self) -> impl Iterator<Item = Habit> + '_ {
        self.0.iter().copied()
    }
}

/// One validated daily self-report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Storage identifier, when the record carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Submission instant (UTC)
    pub date: DateTime<Utc>,
    /// Mood, absent when the stored value was missing or out of range
    pub mood: Option<Mood>,
    /// Hours slept, clamped to 0-24
    pub sleep_hours: Option<f64>,
    /// Tracked habits completed
    pub habits: BTreeSet<Habit>,
    /// Free-text reflection, possibly empty
    pub reflection: String,
}

impl Entry {
    /// Number of tracked habits completed
    pub fn habit_count(&self) -> usize {
        self.habits.len()
    }

    pub fn has_habit(&self, habit: Habit) -> bool {
        self.habits.contains(&habit)
    }
}

/// Aggregates over a trailing calendar window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowRollup {
    /// Lookback length in days
    pub days: u32,
    /// Entries falling inside the window
    pub entry_count: usize,
    /// Mean mood level (0 when no moods were logged)
    pub avg_mood: f64,
    /// Mean sleep hours (0 when no sleep was logged)
    pub avg_sleep_hours: f64,
    /// Habit completion, 0-100
    pub habit_completion_percent: u32,
}

/// Longest consecutive-entry run for a single habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStreak {
    pub habit: Habit,
    pub length: u32,
}

/// Achievement labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "7-Day Streak")]
    SevenDayStreak,
    #[serde(rename = "30-Day Streak")]
    ThirtyDayStreak,
    #[serde(rename = "Weekly Consistency")]
    WeeklyConsistency,
    #[serde(rename = "Monthly Consistency")]
    MonthlyConsistency,
    #[serde(rename = "Meditation Master")]
    MeditationMaster,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::SevenDayStreak => "7-Day Streak",
            Badge::ThirtyDayStreak => "30-Day Streak",
            Badge::WeeklyConsistency => "Weekly Consistency",
            Badge::MonthlyConsistency => "Monthly Consistency",
            Badge::MeditationMaster => "Meditation Master",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which coaching rule produced a tip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingRule {
    SupportiveReflection,
    PositiveReinforcement,
    HabitMomentum,
    LowMood,
    Encouragement,
}

/// Selected coaching text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingTip {
    pub rule: CoachingRule,
    pub message: String,
}

/// One point of the recent-entries trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Day/month label, e.g. "14/7"
    pub label: String,
    pub date: DateTime<Utc>,
    pub mood: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub habits_completed: usize,
}

/// Everything the engine derives from one snapshot of the entry list.
///
/// Deterministic: the same entries, clock and scorer always yield an equal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    pub total_entries: usize,
    /// Consecutive calendar days with an entry, ending today
    pub streak: u32,
    /// Longest run of perfect days among the most recent entries
    pub habit_best_streak: u32,
    pub best_single_habit: Option<HabitStreak>,
    pub weekly: WindowRollup,
    pub monthly: WindowRollup,
    /// Weekly average mood minus the earlier-period proxy
    pub mood_change: f64,
    pub top_habit: Option<Habit>,
    pub level: u32,
    pub badges: Vec<Badge>,
    pub monthly_progress_percent: u32,
    /// Sentiment score of the latest reflection (0 when unavailable)
    pub reflection_sentiment: i32,
    pub coaching_tip: CoachingTip,
    pub wellness_tips: Vec<String>,
    pub trend: Vec<TrendPoint>,
}

/// Derived state plus the decorative, randomly chosen texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub derived: DerivedState,
    pub motivational_prompt: String,
    pub weekly_challenges: Vec<String>,
}

/// Snapshot producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Encoded analytics output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub schema_version: String,
    pub producer: SnapshotProducer,
    pub computed_at_utc: String,
    pub derived: DerivedState,
}
