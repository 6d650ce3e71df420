//! Engine orchestration
//!
//! This module provides the public API for MindMate analytics.
//! It orchestrates the full pipeline from stored records to derived state.

use crate::config::EngineConfig;
use crate::encoder::SnapshotEncoder;
use crate::error::AnalyticsError;
use crate::heuristics::{self, BadgeInputs, CoachingInputs};
use crate::normalizer::EntryNormalizer;
use crate::prompts;
use crate::report;
use crate::rollups::{self, entries_since, window_start};
use crate::sentiment::{LexiconScorer, SentimentScorer};
use crate::store::EntryStore;
use crate::streaks::{self, local_date};
use crate::types::{Dashboard, DerivedState, Entry, Habit, WindowRollup};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

/// Convert a stored JSON entry list to an analytics snapshot JSON (stateless, one-shot).
///
/// # Arguments
/// * `records_json` - Stored entry list (a JSON array; anything else counts as empty)
/// * `now_rfc3339` - Evaluation instant; the current time when `None`
///
/// # Returns
/// Pretty-printed snapshot JSON
///
/// # Example
/// ```ignore
/// let snapshot = entries_to_snapshot(stored_json, Some("2025-07-20T18:00:00Z"))?;
/// ```
pub fn entries_to_snapshot(
    records_json: &str,
    now_rfc3339: Option<&str>,
) -> Result<String, AnalyticsError> {
    let derived = derive_with_defaults(records_json, now_rfc3339)?;
    SnapshotEncoder::new().encode_to_json(&derived)
}

/// Convert a stored JSON entry list to the weekly wellness report text
pub fn entries_to_report(
    records_json: &str,
    now_rfc3339: Option<&str>,
) -> Result<String, AnalyticsError> {
    let derived = derive_with_defaults(records_json, now_rfc3339)?;
    Ok(report::render_report(&derived))
}

fn derive_with_defaults(
    records_json: &str,
    now_rfc3339: Option<&str>,
) -> Result<DerivedState, AnalyticsError> {
    let now = match now_rfc3339 {
        Some(s) => parse_now(s)?,
        None => Utc::now(),
    };
    let engine = WellnessEngine::default();
    Ok(engine.derive_payload(records_json, now, Some(&LexiconScorer::new())))
}

/// Parse an evaluation instant
pub fn parse_now(s: &str) -> Result<DateTime<Utc>, AnalyticsError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AnalyticsError::DateParseError(format!("{s}: {e}")))
}

/// Analytics engine over a snapshot of the entry list.
///
/// Holds configuration only; every call recomputes from scratch.
pub struct WellnessEngine {
    config: EngineConfig,
    normalizer: EntryNormalizer,
}

impl Default for WellnessEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl WellnessEngine {
    pub fn new(config: EngineConfig) -> Self {
        let normalizer = EntryNormalizer::new(&config);
        Self { config, normalizer }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validated entries, newest first
    pub fn normalize(&self, records: &[Value]) -> Vec<Entry> {
        self.normalizer.normalize(records)
    }

    /// Entries from a JSON array payload; anything else is an empty list
    pub fn normalize_payload(&self, records_json: &str) -> Vec<Entry> {
        self.normalizer.normalize_payload(records_json)
    }

    /// Derive state from a JSON array payload
    pub fn derive_payload(
        &self,
        records_json: &str,
        now: DateTime<Utc>,
        scorer: Option<&dyn SentimentScorer>,
    ) -> DerivedState {
        let entries = self.normalize_payload(records_json);
        self.compute(&entries, now, scorer)
    }

    /// Derive state from stored records
    pub fn derive(
        &self,
        records: &[Value],
        now: DateTime<Utc>,
        scorer: Option<&dyn SentimentScorer>,
    ) -> DerivedState {
        let entries = self.normalizer.normalize(records);
        self.compute(&entries, now, scorer)
    }

    /// Derive state from already-typed entries in any order
    pub fn derive_entries(
        &self,
        entries: &[Entry],
        now: DateTime<Utc>,
        scorer: Option<&dyn SentimentScorer>,
    ) -> DerivedState {
        let mut ordered = entries.to_vec();
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        self.compute(&ordered, now, scorer)
    }

    /// Load a snapshot from the store and derive state.
    ///
    /// A failing store is treated as an empty entry list.
    pub fn derive_from_store(
        &self,
        store: &dyn EntryStore,
        now: DateTime<Utc>,
        scorer: Option<&dyn SentimentScorer>,
    ) -> DerivedState {
        let records = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "entry store unavailable, deriving from an empty list");
            Vec::new()
        });
        self.derive(&records, now, scorer)
    }

    /// Attach the randomly chosen texts to a derived state
    pub fn dashboard<R: Rng + ?Sized>(&self, derived: DerivedState, rng: &mut R) -> Dashboard {
        let motivational_prompt = prompts::motivational_prompt(rng).to_string();
        let weekly_challenges = prompts::weekly_challenges(rng, prompts::DEFAULT_CHALLENGE_COUNT)
            .into_iter()
            .map(str::to_string)
            .collect();
        Dashboard {
            derived,
            motivational_prompt,
            weekly_challenges,
        }
    }

    /// Pipeline stages over newest-first entries:
    /// 1. Streaks
    /// 2. Windowed rollups
    /// 3. Reflection sentiment
    /// 4. Heuristic derivation
    fn compute(
        &self,
        entries: &[Entry],
        now: DateTime<Utc>,
        scorer: Option<&dyn SentimentScorer>,
    ) -> DerivedState {
        let config = &self.config;
        let offset = config.offset();
        let catalog = &config.catalog;

        // Stage 1: Streaks
        let streak = streaks::current_streak(entries, local_date(now, offset), offset);
        let habit_best_streak =
            streaks::best_habit_streak(entries, config.habit_streak_window, catalog);
        let best_single_habit =
            streaks::best_single_habit(entries, config.habit_streak_window, catalog);

        // Stage 2: Windowed rollups
        let weekly_entries = entries_since(
            entries,
            window_start(now, config.weekly_lookback_days, offset),
        );
        let monthly_entries = entries_since(
            entries,
            window_start(now, config.monthly_lookback_days, offset),
        );
        let weekly = WindowRollup::compute(weekly_entries, config.weekly_lookback_days, catalog);
        let monthly = WindowRollup::compute(monthly_entries, config.monthly_lookback_days, catalog);
        let mood_change = rollups::mood_change(weekly_entries, monthly_entries);

        // Stage 3: Reflection sentiment
        let reflection_sentiment = entries
            .first()
            .map(|latest| score_reflection(&latest.reflection, scorer))
            .unwrap_or(0);

        // Stage 4: Heuristics
        let badges = heuristics::badges(
            &BadgeInputs {
                streak,
                weekly_completion_percent: weekly.habit_completion_percent,
                monthly_completion_percent: monthly.habit_completion_percent,
                meditated: streaks::any_entry_has(weekly_entries, Habit::Meditation),
            },
            &config.badges,
        );
        let coaching_tip = heuristics::coaching_tip(
            &CoachingInputs {
                sentiment: reflection_sentiment,
                best_single_habit,
                weekly_avg_mood: weekly.avg_mood,
                weekly_mood_samples: weekly_entries.iter().filter(|e| e.mood.is_some()).count(),
            },
            &config.coaching,
        );
        let wellness_tips = entries
            .first()
            .map(|latest| heuristics::wellness_tips(latest, catalog))
            .unwrap_or_default();

        debug!(
            entries = entries.len(),
            streak,
            weekly_entries = weekly.entry_count,
            monthly_entries = monthly.entry_count,
            "derived wellness state"
        );

        DerivedState {
            total_entries: entries.len(),
            streak,
            habit_best_streak,
            best_single_habit,
            mood_change,
            top_habit: rollups::top_habit(weekly_entries, catalog),
            level: heuristics::level(entries.len()),
            badges,
            monthly_progress_percent: heuristics::monthly_progress_percent(
                monthly_entries,
                offset,
                config.monthly_progress_days,
            ),
            reflection_sentiment,
            coaching_tip,
            wellness_tips,
            trend: rollups::trend(entries, config.trend_points, offset),
            weekly,
            monthly,
        }
    }
}

/// Score a reflection; empty text or a failing scorer count as neutral
fn score_reflection(text: &str, scorer: Option<&dyn SentimentScorer>) -> i32 {
    if text.trim().is_empty() {
        return 0;
    }
    let Some(scorer) = scorer else {
        return 0;
    };
    scorer.score(text).unwrap_or_else(|e| {
        warn!(error = %e, "sentiment scorer failed, treating reflection as neutral");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SentimentError, StoreError};
    use crate::store::{MemoryStore, NewEntry};
    use crate::types::{Badge, CoachingRule, Mood};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 20, 18, 0, 0).unwrap()
    }

    fn record(days_ago: i64, mood: u8, habits: &[&str], reflection: &str) -> Value {
        json!({
            "date": (now() - Duration::days(days_ago)).to_rfc3339(),
            "mood": mood,
            "sleepHours": 7,
            "habits": habits,
            "reflection": reflection,
        })
    }

    struct FixedScorer(i32);

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> Result<i32, SentimentError> {
            Ok(self.0)
        }
    }

    struct OfflineScorer;

    impl SentimentScorer for OfflineScorer {
        fn score(&self, _text: &str) -> Result<i32, SentimentError> {
            Err(SentimentError::Unavailable("offline".to_string()))
        }
    }

    struct BrokenStore;

    impl EntryStore for BrokenStore {
        fn load(&self) -> Result<Vec<Value>, StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }

        fn append(&self, _record: Value) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn test_empty_entries() {
        let state = WellnessEngine::default().derive(&[], now(), None);

        assert_eq!(state.total_entries, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.habit_best_streak, 0);
        assert_eq!(state.weekly, WindowRollup { days: 7, ..Default::default() });
        assert_eq!(state.monthly, WindowRollup { days: 29, ..Default::default() });
        assert_eq!(state.mood_change, 0.0);
        assert_eq!(state.level, 1);
        assert!(state.badges.is_empty());
        assert_eq!(state.monthly_progress_percent, 0);
        assert_eq!(state.coaching_tip.rule, CoachingRule::Encouragement);
        assert!(state.wellness_tips.is_empty());
        assert!(state.trend.is_empty());
    }

    #[test]
    fn test_rollup_example() {
        let records = vec![
            record(0, 4, &["exercise", "meditation", "read", "water", "sleep_early"], ""),
            record(1, 2, &[], ""),
        ];
        let state = WellnessEngine::default().derive(&records, now(), None);

        assert!((state.weekly.avg_mood - 3.0).abs() < 1e-9);
        assert_eq!(state.weekly.habit_completion_percent, 50);
        assert_eq!(state.streak, 2);
        assert_eq!(state.habit_best_streak, 1);
    }

    #[test]
    fn test_idempotent() {
        let records: Vec<Value> = (0..12)
            .map(|d| record(d, 3, &["meditation"], "feeling good"))
            .collect();
        let engine = WellnessEngine::default();
        let scorer = LexiconScorer::new();

        let first = engine.derive(&records, now(), Some(&scorer));
        let second = engine.derive(&records, now(), Some(&scorer));
        assert_eq!(first, second);
    }

    #[test]
    fn test_windows_and_badges() {
        let records: Vec<Value> = (0..30)
            .map(|d| record(d, 4, &["exercise", "meditation", "read", "water", "sleep_early"], ""))
            .collect();
        let state = WellnessEngine::default().derive(&records, now(), None);

        assert_eq!(state.streak, 30);
        assert_eq!(state.level, 4);
        // weekly: days 0..=7, monthly: days 0..=29
        assert_eq!(state.weekly.entry_count, 8);
        assert_eq!(state.monthly.entry_count, 30);
        assert_eq!(state.monthly_progress_percent, 100);
        assert_eq!(
            state.badges,
            vec![
                Badge::SevenDayStreak,
                Badge::ThirtyDayStreak,
                Badge::WeeklyConsistency,
                Badge::MonthlyConsistency,
                Badge::MeditationMaster,
            ]
        );
        assert_eq!(state.habit_best_streak, 7);
        assert_eq!(state.top_habit, Some(Habit::Exercise));
    }

    #[test]
    fn test_old_entries_outside_windows() {
        let records = vec![record(40, 5, &["meditation"], "")];
        let state = WellnessEngine::default().derive(&records, now(), None);

        assert_eq!(state.total_entries, 1);
        assert_eq!(state.weekly.entry_count, 0);
        assert_eq!(state.monthly.entry_count, 0);
        assert_eq!(state.streak, 0);
        assert!(state.badges.is_empty());
        assert_eq!(state.trend.len(), 1);
    }

    #[test]
    fn test_negative_reflection_beats_habit_streak() {
        let records: Vec<Value> = (0..5)
            .map(|d| record(d, 4, &["meditation"], "rough day"))
            .collect();
        let engine = WellnessEngine::default();

        let state = engine.derive(&records, now(), Some(&FixedScorer(-3)));
        assert_eq!(state.best_single_habit.map(|s| s.length), Some(5));
        assert_eq!(state.coaching_tip.rule, CoachingRule::SupportiveReflection);

        let state = engine.derive(&records, now(), Some(&FixedScorer(0)));
        assert_eq!(state.coaching_tip.rule, CoachingRule::HabitMomentum);
        assert!(state.coaching_tip.message.contains("Meditation"));
    }

    #[test]
    fn test_scorer_failure_falls_through() {
        let records = vec![record(0, 1, &[], "everything is awful"), record(1, 2, &[], "")];
        let state = WellnessEngine::default().derive(&records, now(), Some(&OfflineScorer));

        assert_eq!(state.reflection_sentiment, 0);
        assert_eq!(state.coaching_tip.rule, CoachingRule::LowMood);
    }

    #[test]
    fn test_lexicon_scores_latest_reflection() {
        let records = vec![
            record(0, 3, &[], "so happy and grateful today"),
            record(1, 3, &[], "terrible awful worst"),
        ];
        let state = WellnessEngine::default().derive(&records, now(), Some(&LexiconScorer::new()));

        assert_eq!(state.reflection_sentiment, 6);
        assert_eq!(state.coaching_tip.rule, CoachingRule::PositiveReinforcement);
    }

    #[test]
    fn test_broken_store_degrades_to_empty() {
        let state = WellnessEngine::default().derive_from_store(&BrokenStore, now(), None);
        assert_eq!(state.total_entries, 0);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_append_then_recompute() {
        let store = MemoryStore::new();
        let engine = WellnessEngine::default();

        store
            .append(NewEntry::new(Mood::Good, now() - Duration::hours(1)).to_record())
            .unwrap();
        assert_eq!(engine.derive_from_store(&store, now(), None).streak, 1);

        store
            .append(NewEntry::new(Mood::Okay, now() - Duration::days(1)).to_record())
            .unwrap();
        let state = engine.derive_from_store(&store, now(), None);
        assert_eq!(state.streak, 2);
        assert_eq!(state.total_entries, 2);
    }

    #[test]
    fn test_derive_entries_sorts_input() {
        let engine = WellnessEngine::default();
        let mut entries = engine.normalize(&[
            record(0, 5, &[], ""),
            record(3, 1, &[], ""),
        ]);
        entries.reverse();

        let state = engine.derive_entries(&entries, now(), None);
        assert_eq!(state.trend.last().and_then(|p| p.mood), Some(5));
    }

    #[test]
    fn test_dashboard_keeps_derived_state() {
        let engine = WellnessEngine::default();
        let derived = engine.derive(&[record(0, 4, &[], "")], now(), None);
        let dashboard = engine.dashboard(derived.clone(), &mut StdRng::seed_from_u64(1));

        assert_eq!(dashboard.derived, derived);
        assert!(prompts::MOTIVATIONAL_PROMPTS.contains(&dashboard.motivational_prompt.as_str()));
        assert_eq!(dashboard.weekly_challenges.len(), 3);
    }

    #[test]
    fn test_entries_to_snapshot() {
        let json = serde_json::to_string(&vec![record(0, 4, &["meditation"], "")]).unwrap();
        let snapshot = entries_to_snapshot(&json, Some("2025-07-20T18:00:00Z")).unwrap();

        let payload: Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(payload["derived"]["total_entries"], 1);
        assert_eq!(payload["derived"]["streak"], 1);
        assert_eq!(payload["derived"]["badges"], json!(["Meditation Master"]));
    }

    #[test]
    fn test_entries_to_snapshot_bad_clock() {
        assert!(matches!(
            entries_to_snapshot("[]", Some("yesterday")),
            Err(AnalyticsError::DateParseError(_))
        ));
    }

    #[test]
    fn test_entries_to_snapshot_non_list_payload() {
        let snapshot = entries_to_snapshot(r#"{"oops": true}"#, Some("2025-07-20T18:00:00Z")).unwrap();
        let payload: Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(payload["derived"]["total_entries"], 0);
        assert_eq!(payload["derived"]["level"], 1);
    }

    #[test]
    fn test_derive_payload_matches_derive() {
        let engine = WellnessEngine::default();
        let records = vec![record(0, 4, &["exercise"], ""), record(1, 3, &[], "")];
        let payload = serde_json::to_string(&records).unwrap();
        assert_eq!(engine.normalize_payload(&payload).len(), 2);
        assert_eq!(
            engine.derive_payload(&payload, now(), None),
            engine.derive(&records, now(), None)
        );
        assert!(engine.normalize_payload(r#"{"date": "2025-07-20"}"#).is_empty());
        assert!(engine.normalize_payload("not json").is_empty());
    }

    #[test]
    fn test_duplicate_catalog_entry_counts_once() {
        let config = EngineConfig::from_json(r#"{"catalog": ["exercise", "exercise"]}"#).unwrap();
        let engine = WellnessEngine::new(config);
        let derived = engine.derive(&[record(0, 4, &["exercise"], "")], now(), None);
        assert_eq!(derived.weekly.habit_completion_percent, 100);
        assert_eq!(derived.habit_best_streak, 1);
    }
}
