//! StatusAggregator - Published Monitor State
//!
//! ## Responsibilities
//!
//! - Hold the single current [`MonitorSnapshot`]
//! - Atomic replace on publish; readers always see a complete snapshot
//!
//! The monitor loop builds each snapshot fully before installing it, so a
//! concurrent reader can observe a stale snapshot but never a partial one.

use crate::actuator::ClimateReading;
use crate::tracker::ViolationRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The externally visible aggregate state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub present: Vec<String>,
    pub absent: Vec<String>,
    pub violations: HashMap<String, Vec<ViolationRecord>>,
    pub environment: Option<ClimateReading>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for MonitorSnapshot {
    /// Empty snapshot served before the pipeline publishes anything
    fn default() -> Self {
        Self {
            present: Vec::new(),
            absent: Vec::new(),
            violations: HashMap::new(),
            environment: None,
            timestamp: None,
        }
    }
}

/// StatusAggregator instance
pub struct StatusAggregator {
    current: RwLock<Arc<MonitorSnapshot>>,
}

impl StatusAggregator {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(MonitorSnapshot::default())),
        }
    }

    /// Install a fully-formed snapshot as the current one
    pub async fn publish(&self, snapshot: MonitorSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().await;
        *current = snapshot;
    }

    /// The latest published snapshot
    pub async fn current(&self) -> Arc<MonitorSnapshot> {
        self.current.read().await.clone()
    }
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}
