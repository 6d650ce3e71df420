//! Entry normalization
//!
//! This module turns loosely-typed stored records into validated entries.
//! - Dates parsed from RFC 3339, plain dates, epoch milliseconds or
//!   `{seconds, nanoseconds}` timestamps
//! - Moods mapped onto the canonical 1-5 scale
//! - Habit keys canonicalized and filtered to the tracked catalog
//! - Output ordered newest first
//!
//! A record without a usable date is dropped; every other defect only blanks
//! the affected field.

use crate::config::{EngineConfig, MoodEncoding};
use crate::types::{Entry, Habit, HabitCatalog, Mood};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Upper bound for logged sleep
pub const MAX_SLEEP_HOURS: f64 = 24.0;

/// Kind of problem found in a stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The record was skipped entirely
    Dropped,
    /// Mood missing, non-numeric or out of range
    InvalidMood,
    /// Habit key not in the habit vocabulary
    UnknownHabit,
    /// Habit known but not tracked by the configured catalog
    UntrackedHabit,
}

/// A problem found in one stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    /// Position of the record in the input list
    pub index: usize,
    pub kind: IssueKind,
    pub message: String,
}

/// Normalizer for converting stored records to entries
pub struct EntryNormalizer {
    offset: FixedOffset,
    mood_encoding: MoodEncoding,
    catalog: HabitCatalog,
}

impl EntryNormalizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            offset: config.offset(),
            mood_encoding: config.mood_encoding,
            catalog: config.catalog.clone(),
        }
    }

    /// Normalize records into entries, newest first
    pub fn normalize(&self, records: &[Value]) -> Vec<Entry> {
        let mut issues = Vec::new();
        let mut entries: Vec<Entry> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| self.parse_record(index, record, &mut issues))
            .collect();

        let dropped = issues
            .iter()
            .filter(|i| i.kind == IssueKind::Dropped)
            .count();
        if dropped > 0 {
            debug!(dropped, total = records.len(), "dropped malformed entry records");
        }

        // Stable: same-instant entries keep their stored order
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }

    /// Normalize a whole stored payload; anything but a JSON array yields no entries
    pub fn normalize_payload(&self, payload: &str) -> Vec<Entry> {
        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Array(records)) => self.normalize(&records),
            Ok(_) => {
                debug!("stored payload is not a list, treating as empty");
                Vec::new()
            }
            Err(e) => {
                debug!(error = %e, "stored payload is not JSON, treating as empty");
                Vec::new()
            }
        }
    }

    /// Report every problem in the records without dropping anything silently
    pub fn validate(&self, records: &[Value]) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        for (index, record) in records.iter().enumerate() {
            self.parse_record(index, record, &mut issues);
        }
        issues
    }

    fn parse_record(
        &self,
        index: usize,
        record: &Value,
        issues: &mut Vec<RecordIssue>,
    ) -> Option<Entry> {
        let Some(fields) = record.as_object() else {
            issues.push(RecordIssue {
                index,
                kind: IssueKind::Dropped,
                message: "record is not an object".to_string(),
            });
            return None;
        };

        let Some(date) = fields.get("date").and_then(|v| parse_date(v, self.offset)) else {
            issues.push(RecordIssue {
                index,
                kind: IssueKind::Dropped,
                message: "missing or unparseable date".to_string(),
            });
            return None;
        };

        let mood = fields.get("mood").and_then(|v| self.parse_mood(v));
        if mood.is_none() {
            issues.push(RecordIssue {
                index,
                kind: IssueKind::InvalidMood,
                message: format!(
                    "mood {} does not map to a mood level",
                    fields.get("mood").unwrap_or(&Value::Null)
                ),
            });
        }

        let sleep_hours = fields
            .get("sleepHours")
            .or_else(|| fields.get("sleep_hours"))
            .or_else(|| fields.get("sleep"))
            .and_then(as_f64)
            .map(|h| h.clamp(0.0, MAX_SLEEP_HOURS));

        let habits = self.parse_habits(index, fields, issues);

        let reflection = fields
            .get("reflection")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let id = fields.get("id").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Some(Entry {
            id,
            date,
            mood,
            sleep_hours,
            habits,
            reflection,
        })
    }

    fn parse_mood(&self, value: &Value) -> Option<Mood> {
        let raw = as_f64(value)?;
        if raw.fract() != 0.0 {
            return None;
        }
        let raw = raw as i64;
        match self.mood_encoding {
            MoodEncoding::OneBased => Mood::from_level(raw),
            MoodEncoding::ZeroBased => Mood::from_index(raw),
        }
    }

    fn parse_habits(
        &self,
        index: usize,
        fields: &Map<String, Value>,
        issues: &mut Vec<RecordIssue>,
    ) -> BTreeSet<Habit> {
        let Some(keys) = fields.get("habits").and_then(Value::as_array) else {
            return BTreeSet::new();
        };

        let mut habits = BTreeSet::new();
        for key in keys.iter().filter_map(Value::as_str) {
            match Habit::from_key(key) {
                Some(habit) if self.catalog.contains(habit) => {
                    habits.insert(habit);
                }
                Some(_) => issues.push(RecordIssue {
                    index,
                    kind: IssueKind::UntrackedHabit,
                    message: format!("habit '{key}' is not tracked"),
                }),
                None => issues.push(RecordIssue {
                    index,
                    kind: IssueKind::UnknownHabit,
                    message: format!("unknown habit '{key}'"),
                }),
            }
        }
        habits
    }
}

/// Parse a stored date value into a UTC instant.
///
/// Values without an explicit offset are read in the local calendar `offset`.
pub fn parse_date(value: &Value, offset: FixedOffset) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim(), offset),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::<Utc>::from_timestamp_millis(millis)
        }
        Value::Object(ts) => {
            let seconds = ts.get("seconds").and_then(Value::as_i64)?;
            let nanos = ts
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0)
                .min(999_999_999) as u32;
            DateTime::<Utc>::from_timestamp(seconds, nanos)
        }
        _ => None,
    }
}

fn parse_date_str(s: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let local = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accept numbers and numeric strings
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;
    use serde_json::json;

    fn normalizer() -> EntryNormalizer {
        EntryNormalizer::new(&EngineConfig::default())
    }

    #[test]
    fn test_orders_newest_first() {
        let records = vec![
            json!({"date": "2025-07-14T09:00:00Z", "mood": 4, "habits": [], "reflection": ""}),
            json!({"date": "2025-07-16T09:00:00Z", "mood": 5, "habits": [], "reflection": ""}),
            json!({"date": "2025-07-15T09:00:00Z", "mood": 3, "habits": [], "reflection": ""}),
        ];
        let entries = normalizer().normalize(&records);

        let moods: Vec<u8> = entries.iter().map(|e| e.mood.unwrap().level()).collect();
        assert_eq!(moods, vec![5, 3, 4]);
    }

    #[test]
    fn test_drops_unparseable_dates() {
        let records = vec![
            json!({"date": "not a date", "mood": 4}),
            json!({"mood": 4}),
            json!("just a string"),
            json!({"date": "2025-07-14", "mood": 4}),
        ];
        let entries = normalizer().normalize(&records);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalizer().normalize(&[]).is_empty());
    }

    #[test]
    fn test_tolerates_missing_fields() {
        let records = vec![json!({"date": "2025-07-14T10:00:00Z", "mood": "happy"})];
        let entries = normalizer().normalize(&records);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.mood, None);
        assert!(entry.habits.is_empty());
        assert_eq!(entry.sleep_hours, None);
        assert_eq!(entry.reflection, "");
    }

    #[test]
    fn test_canonicalizes_habits() {
        let records = vec![json!({
            "date": "2025-07-14T10:00:00Z",
            "mood": 3,
            "habits": ["read", "water", "reading", "juggling", "music"]
        })];
        let entries = normalizer().normalize(&records);

        let habits: Vec<Habit> = entries[0].habits.iter().copied().collect();
        // music is known but not tracked by the default catalog
        assert_eq!(habits, vec![Habit::Reading, Habit::Hydration]);
    }

    #[test]
    fn test_zero_based_moods() {
        let config = EngineConfig::default().with_mood_encoding(MoodEncoding::ZeroBased);
        let records = vec![
            json!({"date": "2025-07-14T10:00:00Z", "mood": 0}),
            json!({"date": "2025-07-13T10:00:00Z", "mood": 4}),
            json!({"date": "2025-07-12T10:00:00Z", "mood": 5}),
        ];
        let entries = EntryNormalizer::new(&config).normalize(&records);

        assert_eq!(entries[0].mood, Some(Mood::VerySad));
        assert_eq!(entries[1].mood, Some(Mood::Amazing));
        assert_eq!(entries[2].mood, None);
    }

    #[test]
    fn test_sleep_clamped_and_aliases() {
        let records = vec![
            json!({"date": "2025-07-14T10:00:00Z", "mood": 3, "sleepHours": 30}),
            json!({"date": "2025-07-13T10:00:00Z", "mood": 3, "sleep": "7.5"}),
        ];
        let entries = normalizer().normalize(&records);
        assert_eq!(entries[0].sleep_hours, Some(24.0));
        assert_eq!(entries[1].sleep_hours, Some(7.5));
    }

    #[test]
    fn test_date_formats() {
        let utc = Utc.fix();
        let expected = Utc.with_ymd_and_hms(2025, 7, 14, 0, 0, 0).unwrap();

        assert_eq!(parse_date(&json!("2025-07-14"), utc), Some(expected));
        assert_eq!(parse_date(&json!("2025-07-14T00:00:00.000Z"), utc), Some(expected));
        assert_eq!(parse_date(&json!(expected.timestamp_millis()), utc), Some(expected));
        assert_eq!(
            parse_date(&json!({"seconds": expected.timestamp(), "nanoseconds": 0}), utc),
            Some(expected)
        );
        assert_eq!(parse_date(&json!(true), utc), None);
    }

    #[test]
    fn test_plain_dates_use_local_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let parsed = parse_date(&json!("2025-07-14"), offset).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 7, 13, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_non_list_payload_is_empty() {
        let n = normalizer();
        assert!(n.normalize_payload(r#"{"date": "2025-07-14"}"#).is_empty());
        assert!(n.normalize_payload("garbage").is_empty());
        assert_eq!(
            n.normalize_payload(r#"[{"date": "2025-07-14", "mood": 2}]"#).len(),
            1
        );
    }

    #[test]
    fn test_validate_reports_issues() {
        let records = vec![
            json!({"date": "2025-07-14T10:00:00Z", "mood": 9, "habits": ["exercise", "juggling"]}),
            json!({"mood": 3}),
        ];
        let issues = normalizer().validate(&records);
        let kinds: Vec<(usize, IssueKind)> = issues.iter().map(|i| (i.index, i.kind.clone())).collect();

        assert_eq!(
            kinds,
            vec![
                (0, IssueKind::InvalidMood),
                (0, IssueKind::UnknownHabit),
                (1, IssueKind::Dropped),
            ]
        );
    }
}
