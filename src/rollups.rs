//! Windowed rollups
//!
//! This module aggregates entries over trailing calendar windows:
//! - Average mood and sleep
//! - Habit completion percentage against the tracked catalog
//! - Mood change between the week and an earlier-period proxy
//! - Most consistent habit and the recent-entries trend series
//!
//! Every function here returns plain numbers for empty input, never NaN.

use crate::types::{Entry, Habit, HabitCatalog, TrendPoint, WindowRollup};
use chrono::{DateTime, Datelike, Days, FixedOffset, Utc};

/// Inclusive lower bound of a window reaching `days` calendar days back from `now`.
///
/// Subtraction happens in the local calendar, so the time of day is kept even
/// across offset changes.
pub fn window_start(now: DateTime<Utc>, days: u32, offset: FixedOffset) -> DateTime<Utc> {
    now.with_timezone(&offset)
        .checked_sub_days(Days::new(u64::from(days)))
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Entries dated at or after `start`.
///
/// `entries` must be ordered newest first, which makes the window a prefix.
pub fn entries_since(entries: &[Entry], start: DateTime<Utc>) -> &[Entry] {
    let end = entries.partition_point(|e| e.date >= start);
    &entries[..end]
}

impl WindowRollup {
    /// Aggregate the entries of one window
    pub fn compute(window: &[Entry], days: u32, catalog: &HabitCatalog) -> Self {
        let completed: usize = window
            .iter()
            .map(|e| tracked_habit_count(e, catalog))
            .sum();

        Self {
            days,
            entry_count: window.len(),
            avg_mood: mean(window.iter().filter_map(|e| e.mood.map(|m| f64::from(m.level())))),
            avg_sleep_hours: mean(window.iter().filter_map(|e| e.sleep_hours)),
            habit_completion_percent: completion_percent(completed, window.len(), catalog.len()),
        }
    }
}

/// `round(100 * completed / (entries * catalog_size))`, 0 when the denominator is 0
pub fn completion_percent(completed: usize, entries: usize, catalog_size: usize) -> u32 {
    let possible = entries * catalog_size;
    if possible == 0 {
        return 0;
    }
    ((100.0 * completed as f64) / possible as f64).round() as u32
}

/// Weekly average mood minus the average of the oldest moods in the monthly window.
///
/// The comparison slice has as many moods as the week, so this is a rough
/// previous-period proxy rather than a true prior-week slice.
pub fn mood_change(weekly: &[Entry], monthly: &[Entry]) -> f64 {
    let weekly_moods: Vec<f64> = moods(weekly).collect();
    let monthly_moods: Vec<f64> = moods(monthly).collect();
    if weekly_moods.is_empty() || monthly_moods.is_empty() {
        return 0.0;
    }

    let take = weekly_moods.len().min(monthly_moods.len());
    // monthly is newest first, so the oldest moods sit at the end
    let earlier = &monthly_moods[monthly_moods.len() - take..];

    mean(weekly_moods.iter().copied()) - mean(earlier.iter().copied())
}

/// Most frequently completed tracked habit; ties go to catalog order
pub fn top_habit(window: &[Entry], catalog: &HabitCatalog) -> Option<Habit> {
    let mut best: Option<(Habit, usize)> = None;
    for habit in catalog.iter() {
        let count = window.iter().filter(|e| e.has_habit(habit)).count();
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((habit, count));
        }
    }
    best.map(|(habit, _)| habit)
}

/// The `points` most recent entries, oldest first
pub fn trend(entries: &[Entry], points: usize, offset: FixedOffset) -> Vec<TrendPoint> {
    entries
        .iter()
        .take(points)
        .rev()
        .map(|e| {
            let local = e.date.with_timezone(&offset);
            TrendPoint {
                label: format!("{}/{}", local.day(), local.month()),
                date: e.date,
                mood: e.mood.map(|m| m.level()),
                sleep_hours: e.sleep_hours,
                habits_completed: e.habit_count(),
            }
        })
        .collect()
}

fn tracked_habit_count(entry: &Entry, catalog: &HabitCatalog) -> usize {
    entry.habits.iter().filter(|h| catalog.contains(**h)).count()
}

fn moods(entries: &[Entry]) -> impl Iterator<Item = f64> + '_ {
    entries
        .iter()
        .filter_map(|e| e.mood.map(|m| f64::from(m.level())))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
