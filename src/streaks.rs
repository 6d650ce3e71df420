//! Streak computation
//!
//! Two different notions of a streak live here:
//! - the current streak walks the local calendar backwards from today
//! - habit streaks walk the most recent entries in list order, ignoring
//!   calendar gaps between them

use crate::types::{Entry, Habit, HabitCatalog, HabitStreak};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::HashSet;

/// Calendar date of an instant in the user's local calendar
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Count consecutive calendar days with at least one entry, ending `today`.
///
/// Returns 0 when nothing was logged today.
pub fn current_streak(entries: &[Entry], today: NaiveDate, offset: FixedOffset) -> u32 {
    let logged: HashSet<NaiveDate> = entries
        .iter()
        .map(|e| local_date(e.date, offset))
        .collect();

    let mut streak = 0;
    let mut day = today;
    while logged.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Longest run of perfect days among the `window` most recent entries.
///
/// `entries` must be newest first; the window is scanned oldest to newest.
pub fn best_habit_streak(entries: &[Entry], window: usize, catalog: &HabitCatalog) -> u32 {
    if catalog.is_empty() {
        return 0;
    }
    longest_run(entries, window, |entry| {
        catalog.iter().all(|habit| entry.has_habit(habit))
    })
}

/// Longest run of consecutive windowed entries containing each tracked habit
pub fn habit_streaks(entries: &[Entry], window: usize, catalog: &HabitCatalog) -> Vec<HabitStreak> {
    catalog
        .iter()
        .map(|habit| HabitStreak {
            habit,
            length: longest_run(entries, window, |entry| entry.has_habit(habit)),
        })
        .collect()
}

/// The habit with the longest run; ties go to the habit listed first in the catalog
pub fn best_single_habit(
    entries: &[Entry],
    window: usize,
    catalog: &HabitCatalog,
) -> Option<HabitStreak> {
    let mut best: Option<HabitStreak> = None;
    for streak in habit_streaks(entries, window, catalog) {
        if streak.length > best.map_or(0, |b| b.length) {
            best = Some(streak);
        }
    }
    best
}

/// Whether a habit appears in any of the given entries
pub fn any_entry_has(entries: &[Entry], habit: Habit) -> bool {
    entries.iter().any(|e| e.has_habit(habit))
}

fn longest_run(entries: &[Entry], window: usize, hit: impl Fn(&Entry) -> bool) -> u32 {
    let mut best = 0;
    let mut run = 0;
    for entry in entries.iter().take(window).rev() {
        if hit(entry) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}
