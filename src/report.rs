//! Weekly wellness report text

use crate::types::DerivedState;
use std::fmt::Write;

/// Shown when nothing was logged in the weekly window
pub const EMPTY_REPORT: &str = "Log some entries to see your personalized Wellness Report!";

const HIGH_CONSISTENCY_PERCENT: u32 = 80;
const LOW_CONSISTENCY_PERCENT: u32 = 40;

/// Render the weekly report.
///
/// Line order: average mood (with change), most consistent habit,
/// consistency remark, closing tip. Lines without data are skipped.
pub fn render_report(derived: &DerivedState) -> String {
    let weekly = &derived.weekly;
    if weekly.entry_count == 0 {
        return EMPTY_REPORT.to_string();
    }

    let mut report = format!("This week, your average mood was {:.2} / 5", weekly.avg_mood);
    if derived.mood_change != 0.0 {
        let direction = if derived.mood_change > 0.0 {
            "improved"
        } else {
            "declined"
        };
        let _ = write!(
            report,
            " ({direction} by {:.2} from last week)",
            derived.mood_change.abs()
        );
    }
    report.push_str(".\n");

    if let Some(habit) = derived.top_habit {
        let _ = writeln!(report, "{} was your most consistent habit. Keep it up!", habit.label());
    }

    let percent = weekly.habit_completion_percent;
    if percent >= HIGH_CONSISTENCY_PERCENT {
        let _ = writeln!(report, "Amazing habit consistency ({percent}%)!");
    } else if percent < LOW_CONSISTENCY_PERCENT {
        report.push_str("Try to complete more habits for a better week.\n");
    }

    report.push_str("Tip: Reflect on what made this week different and set a small goal for next week.");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WellnessEngine;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 20, 18, 0, 0).unwrap()
    }

    fn record(days_ago: i64, mood: u8, habits: &[&str]) -> Value {
        json!({
            "date": (now() - Duration::days(days_ago)).to_rfc3339(),
            "mood": mood,
            "habits": habits,
        })
    }

    fn report_for(records: &[Value]) -> String {
        render_report(&WellnessEngine::default().derive(records, now(), None))
    }

    #[test]
    fn test_empty_week() {
        assert_eq!(report_for(&[]), EMPTY_REPORT);
        assert_eq!(report_for(&[record(20, 3, &["exercise"])]), EMPTY_REPORT);
    }

    #[test]
    fn test_full_report() {
        let all = ["exercise", "meditation", "reading", "hydration", "sleep_early"];
        let report = report_for(&[record(0, 5, &all), record(1, 4, &all), record(20, 2, &[])]);

        // weekly 4.50 vs the two oldest monthly moods (4, 2) averaging 3.00
        assert_eq!(
            report,
            "This week, your average mood was 4.50 / 5 (improved by 1.50 from last week).\n\
             Exercise was your most consistent habit. Keep it up!\n\
             Amazing habit consistency (100%)!\n\
             Tip: Reflect on what made this week different and set a small goal for next week."
        );
    }

    #[test]
    fn test_declining_low_consistency() {
        let report = report_for(&[record(0, 1, &[]), record(25, 5, &[])]);

        assert!(report.starts_with(
            "This week, your average mood was 1.00 / 5 (declined by 4.00 from last week).\n"
        ));
        assert!(!report.contains("most consistent habit"));
        assert!(report.contains("Try to complete more habits for a better week.\n"));
    }

    #[test]
    fn test_middle_consistency_has_no_remark() {
        let report = report_for(&[record(0, 3, &["exercise", "meditation", "reading"])]);

        assert!(report.starts_with("This week, your average mood was 3.00 / 5.\n"));
        assert!(!report.contains("Amazing"));
        assert!(!report.contains("Try to complete"));
    }
}
