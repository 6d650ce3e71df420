//! Snapshot encoding
//!
//! This module wraps a derived state into a versioned analytics snapshot
//! that hosts can persist or hand across the FFI boundary.

use crate::error::AnalyticsError;
use crate::types::{AnalyticsSnapshot, DerivedState, SnapshotProducer};
use crate::{MINDMATE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Current snapshot schema version
pub const SNAPSHOT_SCHEMA_VERSION: &str = "1.0.0";

/// Encoder for analytics snapshots
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a derived state, stamped with the current time
    pub fn encode(&self, derived: &DerivedState) -> AnalyticsSnapshot {
        self.encode_at(derived, Utc::now())
    }

    /// Encode a derived state with an explicit computation time
    pub fn encode_at(&self, derived: &DerivedState, computed_at: DateTime<Utc>) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            producer: SnapshotProducer {
                name: PRODUCER_NAME.to_string(),
                version: MINDMATE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: computed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            derived: derived.clone(),
        }
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(&self, derived: &DerivedState) -> Result<String, AnalyticsError> {
        let snapshot = self.encode(derived);
        serde_json::to_string_pretty(&snapshot).map_err(AnalyticsError::JsonError)
    }

    /// Encode to a single-line JSON string
    pub fn encode_to_json_compact(&self, derived: &DerivedState) -> Result<String, AnalyticsError> {
        let snapshot = self.encode(derived);
        serde_json::to_string(&snapshot).map_err(AnalyticsError::JsonError)
    }
}
