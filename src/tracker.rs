//! ViolationTracker - Per-Person Violation Ledger
//!
//! ## Responsibilities
//!
//! - Deduplicate violations per (person, kind) pair
//! - Emit each violation exactly once while it stays active
//! - Clear the ledger on explicit reset only
//!
//! A sustained condition across many frames counts as a single violation.
//! Records never expire on their own; `reset` is the only way back to
//! inactive (e.g. between class periods via the reset endpoint).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Violation categories detected by the heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Head turned away from the board (cheating-class signal)
    LookingAway,
    /// Head abnormally low in frame
    Sleeping,
    /// Observed uniform contradicts the enrolled label
    UniformMismatch,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::LookingAway => "looking_away",
            ViolationKind::Sleeping => "sleeping",
            ViolationKind::UniformMismatch => "uniform_mismatch",
        }
    }

    /// Cheating-class kinds additionally pulse the warning indicator
    pub fn is_cheating(&self) -> bool {
        matches!(self, ViolationKind::LookingAway)
    }
}

/// Ledger entry for one active (person, kind) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub kind: ViolationKind,
    pub first_seen: DateTime<Utc>,
}

/// Event emitted when a violation first becomes active
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationEvent {
    pub person: String,
    pub kind: ViolationKind,
    pub timestamp: DateTime<Utc>,
}

/// ViolationTracker instance
pub struct ViolationTracker {
    // Keyed by (person, kind); at most one active record per pair.
    // RwLock because the reset endpoint mutates from the serving task
    // while the monitor loop reports.
    records: RwLock<HashMap<(String, ViolationKind), ViolationRecord>>,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Report a violation observation.
    ///
    /// Returns the event to emit if this activates a new record, `None`
    /// when the pair is already active (idempotent).
    pub async fn report(&self, person: &str, kind: ViolationKind) -> Option<ViolationEvent> {
        let key = (person.to_string(), kind);
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return None;
        }

        let now = Utc::now();
        records.insert(
            key,
            ViolationRecord {
                kind,
                first_seen: now,
            },
        );

        tracing::warn!(
            person = %person,
            kind = %kind.as_str(),
            "Violation recorded"
        );

        Some(ViolationEvent {
            person: person.to_string(),
            kind,
            timestamp: now,
        })
    }

    /// Active violations grouped by person, for snapshot publication
    pub async fn active_by_person(&self) -> HashMap<String, Vec<ViolationRecord>> {
        let records = self.records.read().await;
        let mut grouped: HashMap<String, Vec<ViolationRecord>> = HashMap::new();
        for ((person, _), record) in records.iter() {
            grouped.entry(person.clone()).or_default().push(record.clone());
        }
        for list in grouped.values_mut() {
            list.sort_by_key(|r| r.first_seen);
        }
        grouped
    }

    /// Number of active records
    pub async fn active_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clear the ledger; previously reported pairs can emit again
    pub async fn reset(&self) {
        let mut records = self.records.write().await;
        let cleared = records.len();
        records.clear();
        tracing::info!(cleared, "Violation ledger reset");
    }
}

impl Default for ViolationTracker {
    fn default() -> Self {
        Self::new()
    }
}
