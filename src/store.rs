//! Entry storage collaborators
//!
//! The engine never owns the entry list. It borrows a snapshot through
//! [`EntryStore::load`] on every call; writers append through the same trait
//! and then ask the engine to recompute.

use crate::config::MoodEncoding;
use crate::error::StoreError;
use crate::types::{Habit, Mood};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Source of stored entry records
pub trait EntryStore {
    /// Everything stored so far; an empty list when nothing was saved yet
    fn load(&self) -> Result<Vec<Value>, StoreError>;

    /// Add one immutable record
    fn append(&self, record: Value) -> Result<(), StoreError>;
}

/// In-process store, mainly for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryStore {
    fn load(&self) -> Result<Vec<Value>, StoreError> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn append(&self, record: Value) -> Result<(), StoreError> {
        self.records
            .lock()
            .map(|mut records| records.push(record))
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

/// Whole-file JSON array store.
///
/// Every call reads (and `append` rewrites) the full file. There is no
/// locking: concurrent writers race and the last write wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Value>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "entry file missing, starting empty");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Array(records) => Ok(records),
            _ => Err(StoreError::Malformed),
        }
    }

    fn append(&self, record: Value) -> Result<(), StoreError> {
        let mut records = self.load()?;
        records.push(record);
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Builder for a new record in the stored format
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub date: DateTime<Utc>,
    pub mood: Mood,
    pub sleep_hours: f64,
    pub habits: Vec<Habit>,
    pub reflection: String,
}

impl NewEntry {
    pub fn new(mood: Mood, date: DateTime<Utc>) -> Self {
        Self {
            date,
            mood,
            sleep_hours: 8.0,
            habits: Vec::new(),
            reflection: String::new(),
        }
    }

    pub fn sleep_hours(mut self, hours: f64) -> Self {
        self.sleep_hours = hours;
        self
    }

    pub fn habits(mut self, habits: impl IntoIterator<Item = Habit>) -> Self {
        self.habits = habits.into_iter().collect();
        self
    }

    pub fn reflection(mut self, text: impl Into<String>) -> Self {
        self.reflection = text.into();
        self
    }

    /// Stored record with a fresh id; mood is written 1-based
    pub fn to_record(&self) -> Value {
        self.to_record_encoded(MoodEncoding::OneBased)
    }

    /// Stored record with the mood written in the given encoding
    pub fn to_record_encoded(&self, encoding: MoodEncoding) -> Value {
        let habits: Vec<&str> = self.habits.iter().map(|h| h.as_str()).collect();
        json!({
            "id": Uuid::new_v4().to_string(),
            "date": self.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            "mood": encoding.encode(self.mood),
            "sleepHours": self.sleep_hours,
            "habits": habits,
            "reflection": self.reflection,
        })
    }
}
