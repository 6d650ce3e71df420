//! Generate an analytics snapshot from a week of journal entries

use chrono::{Duration, Utc};
use mindmate::{
    EntryStore, Habit, LexiconScorer, MemoryStore, Mood, NewEntry, SnapshotEncoder, WellnessEngine,
};

fn main() {
    let now = Utc::now();
    let store = MemoryStore::new();

    let week = [
        (Mood::Okay, 6.0, vec![Habit::Hydration], "Tired after a long day"),
        (Mood::Good, 7.5, vec![Habit::Exercise, Habit::Hydration], "Nice walk in the park"),
        (Mood::Good, 8.0, vec![Habit::Exercise, Habit::Reading], ""),
        (Mood::Amazing, 7.0, vec![Habit::Exercise, Habit::Meditation, Habit::Reading], "Feeling great and grateful"),
    ];
    for (days_ago, (mood, sleep, habits, reflection)) in week.into_iter().rev().enumerate() {
        let entry = NewEntry::new(mood, now - Duration::days(days_ago as i64))
            .sleep_hours(sleep)
            .habits(habits)
            .reflection(reflection);
        if let Err(e) = store.append(entry.to_record()) {
            eprintln!("Error: {e:?}");
            return;
        }
    }

    let engine = WellnessEngine::default();
    let derived = engine.derive_from_store(&store, now, Some(&LexiconScorer::new()));
    match SnapshotEncoder::new().encode_to_json(&derived) {
        Ok(snapshot) => print!("{snapshot}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
