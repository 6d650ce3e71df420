//! Heuristic derivation
//!
//! This module maps rollups and streaks onto discrete signals:
//! - Level from the total entry count
//! - Badges, each rule evaluated independently
//! - Monthly progress against a fixed 30-day denominator
//! - A coaching tip from an ordered rule chain (first match wins)
//! - Short wellness tips for the latest entry
//!
//! Everything here is deterministic. Random texts live in [`crate::prompts`].

use crate::config::{BadgeThresholds, CoachingThresholds};
use crate::streaks::local_date;
use crate::types::{Badge, CoachingRule, CoachingTip, Entry, Habit, HabitCatalog, HabitStreak, Mood};
use chrono::FixedOffset;
use std::collections::HashSet;

/// Entries needed per level
pub const ENTRIES_PER_LEVEL: usize = 10;

/// Maximum number of wellness tips returned
pub const MAX_WELLNESS_TIPS: usize = 3;

/// `max(1, floor(total / 10) + 1)`
pub fn level(total_entries: usize) -> u32 {
    let level = total_entries / ENTRIES_PER_LEVEL + 1;
    u32::try_from(level).unwrap_or(u32::MAX).max(1)
}

/// Inputs to the badge rules
#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeInputs {
    pub streak: u32,
    pub weekly_completion_percent: u32,
    pub monthly_completion_percent: u32,
    /// Any entry of the evaluated window logged meditation
    pub meditated: bool,
}

/// Award every badge whose rule fires
pub fn badges(inputs: &BadgeInputs, thresholds: &BadgeThresholds) -> Vec<Badge> {
    let rules = [
        (inputs.streak >= thresholds.short_streak_days, Badge::SevenDayStreak),
        (inputs.streak >= thresholds.long_streak_days, Badge::ThirtyDayStreak),
        (
            inputs.weekly_completion_percent >= thresholds.weekly_consistency_percent,
            Badge::WeeklyConsistency,
        ),
        (
            inputs.monthly_completion_percent >= thresholds.monthly_consistency_percent,
            Badge::MonthlyConsistency,
        ),
        (inputs.meditated, Badge::MeditationMaster),
    ];

    rules
        .into_iter()
        .filter_map(|(fired, badge)| fired.then_some(badge))
        .collect()
}

/// `round(100 * distinct logged days / denominator_days)`, capped at 100
pub fn monthly_progress_percent(window: &[Entry], offset: FixedOffset, denominator_days: u32) -> u32 {
    if denominator_days == 0 {
        return 0;
    }
    let days: HashSet<_> = window.iter().map(|e| local_date(e.date, offset)).collect();
    let percent = (100.0 * days.len() as f64 / f64::from(denominator_days)).round() as u32;
    percent.min(100)
}

/// Inputs to the coaching rule chain
#[derive(Debug, Clone, Copy)]
pub struct CoachingInputs {
    /// Score of the most recent reflection, 0 when unavailable
    pub sentiment: i32,
    pub best_single_habit: Option<HabitStreak>,
    pub weekly_avg_mood: f64,
    /// Number of weekly entries carrying a mood
    pub weekly_mood_samples: usize,
}

/// Pick the coaching tip; rules are tried in priority order
pub fn coaching_tip(inputs: &CoachingInputs, thresholds: &CoachingThresholds) -> CoachingTip {
    if inputs.sentiment < thresholds.negative_sentiment {
        return tip(
            CoachingRule::SupportiveReflection,
            "It sounds like today was heavy. Be gentle with yourself, and consider reaching out to someone you trust.".to_string(),
        );
    }
    if inputs.sentiment > thresholds.positive_sentiment {
        return tip(
            CoachingRule::PositiveReinforcement,
            "Your reflection sounds upbeat! Write down what went well so you can come back to it.".to_string(),
        );
    }
    if let Some(streak) = inputs
        .best_single_habit
        .filter(|s| s.length >= thresholds.habit_streak)
    {
        return tip(
            CoachingRule::HabitMomentum,
            format!(
                "{} entries in a row with {}. Keep the chain going!",
                streak.length,
                streak.habit.label()
            ),
        );
    }
    // An empty week averages to 0 but has no mood to call low.
    if inputs.weekly_mood_samples > 0 && inputs.weekly_avg_mood < thresholds.low_mood {
        return tip(
            CoachingRule::LowMood,
            "Your mood has been low this week. Small steps count: a short walk or a few deep breaths can help.".to_string(),
        );
    }
    tip(
        CoachingRule::Encouragement,
        "Keep logging each day. Every entry helps you understand yourself a little better.".to_string(),
    )
}

fn tip(rule: CoachingRule, message: String) -> CoachingTip {
    CoachingTip { rule, message }
}

/// Practical tips for one entry, at most [`MAX_WELLNESS_TIPS`].
///
/// Habit suggestions are only made for habits the catalog tracks.
pub fn wellness_tips(entry: &Entry, catalog: &HabitCatalog) -> Vec<String> {
    let mut tips: Vec<&str> = Vec::new();

    match entry.mood {
        Some(Mood::VerySad | Mood::Sad) => {
            tips.push("Consider reaching out to someone you trust today");
            tips.push("Try some gentle breathing exercises");
            tips.push("Remember: this feeling is temporary");
        }
        Some(Mood::Good | Mood::Amazing) => {
            tips.push("Great mood! Share your positive energy with others");
            tips.push("Document what made you feel good today");
        }
        _ => {}
    }

    match entry.sleep_hours {
        Some(hours) if hours < 6.0 => {
            tips.push("Try to get to bed 30 minutes earlier tonight");
            tips.push("Consider a relaxing bedtime routine");
        }
        Some(hours) if hours > 9.0 => {
            tips.push("You might be oversleeping - try setting a consistent wake time");
        }
        _ => {}
    }

    let habit_tips = [
        (Habit::Exercise, "Even a 10-minute walk can boost your mood!"),
        (Habit::Meditation, "Try 5 minutes of mindfulness or deep breathing"),
        (Habit::Gratitude, "Write down three things you're grateful for"),
    ];
    for (habit, text) in habit_tips {
        if catalog.contains(habit) && !entry.has_habit(habit) {
            tips.push(text);
        }
    }

    tips.into_iter()
        .take(MAX_WELLNESS_TIPS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Offset, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn entry(days_ago: i64, mood: Option<Mood>, sleep: Option<f64>, habits: &[Habit]) -> Entry {
        Entry {
            id: None,
            date: Utc.with_ymd_and_hms(2025, 7, 20, 12, 0, 0).unwrap() - Duration::days(days_ago),
            mood,
            sleep_hours: sleep,
            habits: habits.iter().copied().collect(),
            reflection: String::new(),
        }
    }

    #[test]
    fn test_level_formula() {
        assert_eq!(level(0), 1);
        assert_eq!(level(9), 1);
        assert_eq!(level(10), 2);
        assert_eq!(level(25), 3);
        for k in 0..50 {
            assert_eq!(level(10 * k), k as u32 + 1);
        }
    }

    #[test]
    fn test_level_monotonic() {
        let mut previous = level(0);
        for n in 1..500 {
            let current = level(n);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_no_badges_by_default() {
        assert!(badges(&BadgeInputs::default(), &BadgeThresholds::default()).is_empty());
    }

    #[test]
    fn test_seven_day_streak_only() {
        let inputs = BadgeInputs {
            streak: 7,
            ..Default::default()
        };
        assert_eq!(badges(&inputs, &BadgeThresholds::default()), vec![Badge::SevenDayStreak]);
    }

    #[test]
    fn test_thirty_day_streak_includes_seven() {
        let inputs = BadgeInputs {
            streak: 30,
            ..Default::default()
        };
        let awarded = badges(&inputs, &BadgeThresholds::default());
        assert!(awarded.contains(&Badge::SevenDayStreak));
        assert!(awarded.contains(&Badge::ThirtyDayStreak));
    }

    #[test]
    fn test_all_badges() {
        let inputs = BadgeInputs {
            streak: 31,
            weekly_completion_percent: 90,
            monthly_completion_percent: 95,
            meditated: true,
        };
        assert_eq!(
            badges(&inputs, &BadgeThresholds::default()),
            vec![
                Badge::SevenDayStreak,
                Badge::ThirtyDayStreak,
                Badge::WeeklyConsistency,
                Badge::MonthlyConsistency,
                Badge::MeditationMaster,
            ]
        );
    }

    #[test]
    fn test_monthly_progress_counts_distinct_days() {
        let window = vec![
            entry(0, None, None, &[]),
            entry(0, None, None, &[]),
            entry(1, None, None, &[]),
            entry(5, None, None, &[]),
        ];
        // 3 distinct days out of 30 = 10%
        assert_eq!(monthly_progress_percent(&window, Utc.fix(), 30), 10);
        assert_eq!(monthly_progress_percent(&[], Utc.fix(), 30), 0);
    }

    #[test]
    fn test_monthly_progress_caps_at_100() {
        let window: Vec<Entry> = (0..40).map(|d| entry(d, None, None, &[])).collect();
        assert_eq!(monthly_progress_percent(&window, Utc.fix(), 30), 100);
    }

    fn coaching(sentiment: i32, streak: u32, avg_mood: f64) -> CoachingRule {
        let inputs = CoachingInputs {
            sentiment,
            best_single_habit: Some(HabitStreak {
                habit: Habit::Meditation,
                length: streak,
            }),
            weekly_avg_mood: avg_mood,
            weekly_mood_samples: 3,
        };
        coaching_tip(&inputs, &CoachingThresholds::default()).rule
    }

    #[test]
    fn test_negative_sentiment_beats_habit_streak() {
        assert_eq!(coaching(-3, 5, 4.0), CoachingRule::SupportiveReflection);
    }

    #[test]
    fn test_coaching_priority_chain() {
        assert_eq!(coaching(3, 5, 1.0), CoachingRule::PositiveReinforcement);
        assert_eq!(coaching(0, 3, 1.0), CoachingRule::HabitMomentum);
        assert_eq!(coaching(-2, 2, 2.4), CoachingRule::LowMood);
        assert_eq!(coaching(2, 2, 2.5), CoachingRule::Encouragement);
    }

    #[test]
    fn test_habit_tip_names_the_habit() {
        let inputs = CoachingInputs {
            sentiment: 0,
            best_single_habit: Some(HabitStreak {
                habit: Habit::SleepEarly,
                length: 4,
            }),
            weekly_avg_mood: 3.0,
            weekly_mood_samples: 1,
        };
        let tip = coaching_tip(&inputs, &CoachingThresholds::default());
        assert!(tip.message.contains("Sleep Early"));
        assert!(tip.message.starts_with('4'));
    }

    #[test]
    fn test_empty_week_is_not_low_mood() {
        let inputs = CoachingInputs {
            sentiment: 0,
            best_single_habit: None,
            weekly_avg_mood: 0.0,
            weekly_mood_samples: 0,
        };
        assert_eq!(
            coaching_tip(&inputs, &CoachingThresholds::default()).rule,
            CoachingRule::Encouragement
        );
    }

    #[test]
    fn test_wellness_tips_low_mood_short_sleep() {
        let tips = wellness_tips(
            &entry(0, Some(Mood::Sad), Some(5.0), &[]),
            &HabitCatalog::default(),
        );
        assert_eq!(
            tips,
            vec![
                "Consider reaching out to someone you trust today".to_string(),
                "Try some gentle breathing exercises".to_string(),
                "Remember: this feeling is temporary".to_string(),
            ]
        );
    }

    #[test]
    fn test_wellness_tips_skip_untracked_and_done_habits() {
        let tips = wellness_tips(
            &entry(0, Some(Mood::Okay), Some(8.0), &[Habit::Exercise]),
            &HabitCatalog::default(),
        );
        // gratitude is not tracked by default, exercise is done
        assert_eq!(tips, vec!["Try 5 minutes of mindfulness or deep breathing".to_string()]);
    }
}
