//! PresenceTracker - Attendance Accounting
//!
//! ## Responsibilities
//!
//! - Recompute present/absent against the roster every frame
//! - Fire the absence alarm at most once per session
//!
//! The absent list is always current; the alarm flag is sticky until an
//! explicit reset. The two are deliberately separate pieces of state.

use crate::roster::Roster;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-frame attendance result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceState {
    pub present: Vec<String>,
    pub absent: Vec<String>,
}

/// One-shot alarm payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceAlarm {
    pub absent: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// PresenceTracker instance
pub struct PresenceTracker {
    roster: Arc<Roster>,
    absence_threshold: usize,
    alarm_fired: RwLock<bool>,
}

impl PresenceTracker {
    pub fn new(roster: Arc<Roster>, absence_threshold: usize) -> Self {
        Self {
            roster,
            absence_threshold,
            alarm_fired: RwLock::new(false),
        }
    }

    /// Fold one frame's recognized identities into an attendance state.
    ///
    /// Returns the alarm exactly once per session, the first time the
    /// absent count reaches the threshold.
    pub async fn observe<I, S>(&self, recognized: I) -> (PresenceState, Option<AbsenceAlarm>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let seen: BTreeSet<String> = recognized
            .into_iter()
            .filter(|id| self.roster.contains(id.as_ref()))
            .map(|id| id.as_ref().to_string())
            .collect();

        let absent: Vec<String> = self
            .roster
            .ids()
            .into_iter()
            .filter(|id| !seen.contains(id))
            .collect();
        let present: Vec<String> = seen.into_iter().collect();

        let alarm = if absent.len() >= self.absence_threshold {
            let mut fired = self.alarm_fired.write().await;
            if *fired {
                None
            } else {
                *fired = true;
                Some(AbsenceAlarm {
                    absent: absent.clone(),
                    timestamp: Utc::now(),
                })
            }
        } else {
            None
        };

        (PresenceState { present, absent }, alarm)
    }

    /// Whether the alarm already fired this session
    pub async fn alarm_fired(&self) -> bool {
        *self.alarm_fired.read().await
    }

    /// Re-arm the absence alarm
    pub async fn reset(&self) {
        let mut fired = self.alarm_fired.write().await;
        if *fired {
            tracing::info!("Absence alarm re-armed");
        }
        *fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(threshold: usize) -> PresenceTracker {
        let roster = Arc::new(Roster::from_entries([("sv01", "white"), ("sv02", "white")]));
        PresenceTracker::new(roster, threshold)
    }

    #[tokio::test]
    async fn test_present_absent_partition() {
        let tracker = tracker(2);
        let (state, _) = tracker.observe(["sv01"]).await;
        assert_eq!(state.present, vec!["sv01".to_string()]);
        assert_eq!(state.absent, vec!["sv02".to_string()]);
    }

    #[tokio::test]
    async fn test_unrecognized_ids_are_ignored() {
        let tracker = tracker(2);
        let (state, _) = tracker.observe(["sv01", "stranger"]).await;
        assert_eq!(state.present, vec!["sv01".to_string()]);
    }

    #[tokio::test]
    async fn test_alarm_fires_once_per_session() {
        let tracker = tracker(1);
        let mut fired = 0;
        for _ in 0..5 {
            let (_, alarm) = tracker.observe(["sv01"]).await;
            if alarm.is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(tracker.alarm_fired().await);
    }

    #[tokio::test]
    async fn test_alarm_below_threshold_does_not_fire() {
        let tracker = tracker(2);
        let (_, alarm) = tracker.observe(["sv01"]).await;
        assert!(alarm.is_none());
        assert!(!tracker.alarm_fired().await);
    }

    #[tokio::test]
    async fn test_absent_list_stays_fresh_after_alarm() {
        let tracker = tracker(1);
        let (_, alarm) = tracker.observe(["sv01"]).await;
        assert!(alarm.is_some());

        // Everyone shows up; the list updates even though the flag is set
        let (state, alarm) = tracker.observe(["sv01", "sv02"]).await;
        assert!(alarm.is_none());
        assert!(state.absent.is_empty());
    }

    #[tokio::test]
    async fn test_reset_rearms_alarm() {
        let tracker = tracker(1);
        let (_, first) = tracker.observe::<_, &str>([]).await;
        assert!(first.is_some());

        tracker.reset().await;
        let (_, second) = tracker.observe::<_, &str>([]).await;
        assert!(second.is_some());
    }
}
