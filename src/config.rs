//! Engine configuration
//!
//! Every tunable of the engine lives here: the local calendar used for day
//! matching, the mood encoding used by stored records, the tracked habit
//! catalog, window lengths and the badge and coaching thresholds.

use crate::error::ConfigError;
use crate::types::{HabitCatalog, Mood};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable the CLI consults for a config file path
pub const CONFIG_ENV_VAR: &str = "MINDMATE_CONFIG";

/// How stored records encode the mood value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodEncoding {
    /// 1 = Very Sad .. 5 = Amazing
    #[default]
    OneBased,
    /// 0 = Very Sad .. 4 = Amazing
    ZeroBased,
}

impl MoodEncoding {
    /// Stored value for a mood
    pub fn encode(self, mood: Mood) -> u8 {
        match self {
            MoodEncoding::OneBased => mood.level(),
            MoodEncoding::ZeroBased => mood.level() - 1,
        }
    }
}

/// Thresholds for badge rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeThresholds {
    pub short_streak_days: u32,
    pub long_streak_days: u32,
    pub weekly_consistency_percent: u32,
    pub monthly_consistency_percent: u32,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            short_streak_days: 7,
            long_streak_days: 30,
            weekly_consistency_percent: 90,
            monthly_consistency_percent: 90,
        }
    }
}

/// Thresholds for the coaching rule chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachingThresholds {
    /// Reflection scores strictly below this trigger the supportive message
    pub negative_sentiment: i32,
    /// Reflection scores strictly above this trigger positive reinforcement
    pub positive_sentiment: i32,
    /// Minimum single-habit run that earns a mention
    pub habit_streak: u32,
    /// Weekly average mood strictly below this counts as low
    pub low_mood: f64,
}

impl Default for CoachingThresholds {
    fn default() -> Self {
        Self {
            negative_sentiment: -2,
            positive_sentiment: 2,
            habit_streak: 3,
            low_mood: 2.5,
        }
    }
}

/// Configuration for [`crate::engine::WellnessEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offset of the user's local calendar from UTC, in minutes
    pub utc_offset_minutes: i32,
    pub mood_encoding: MoodEncoding,
    pub catalog: HabitCatalog,
    pub weekly_lookback_days: u32,
    pub monthly_lookback_days: u32,
    /// Fixed denominator of the monthly progress percentage
    pub monthly_progress_days: u32,
    /// Number of most recent entries scanned for habit streaks
    pub habit_streak_window: usize,
    pub trend_points: usize,
    pub badges: BadgeThresholds,
    pub coaching: CoachingThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            mood_encoding: MoodEncoding::OneBased,
            catalog: HabitCatalog::default(),
            weekly_lookback_days: 7,
            monthly_lookback_days: 29,
            monthly_progress_days: 30,
            habit_streak_window: 7,
            trend_points: 7,
            badges: BadgeThresholds::default(),
            coaching: CoachingThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set the local calendar offset
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn with_catalog(mut self, catalog: HabitCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_mood_encoding(mut self, encoding: MoodEncoding) -> Self {
        self.mood_encoding = encoding;
        self
    }

    /// The user's local calendar; falls back to UTC for an invalid offset
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue {
                field: "utc_offset_minutes",
                reason: format!("{} is outside (-1440, 1440)", self.utc_offset_minutes),
            });
        }
        let windows = [
            ("weekly_lookback_days", self.weekly_lookback_days as usize),
            ("monthly_lookback_days", self.monthly_lookback_days as usize),
            ("monthly_progress_days", self.monthly_progress_days as usize),
            ("habit_streak_window", self.habit_streak_window),
        ];
        for (field, value) in windows {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "catalog",
                reason: "at least one habit must be tracked".to_string(),
            });
        }
        Ok(())
    }
}
