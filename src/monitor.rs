//! MonitorLoop - Per-Frame Pipeline Orchestration
//!
//! ## Responsibilities
//!
//! - Drive capture -> identify -> classify -> track -> publish per frame
//! - Own the session lifecycle (start, stop, clean termination)
//!
//! The loop is a single sequential task: one frame fully processed and its
//! snapshot published before the next capture. The serving side only ever
//! touches the published snapshot and the event hub.

use crate::actuator::{ActuatorBridge, SignalChannel};
use crate::capture::FrameSource;
use crate::environment::EnvironmentPoller;
use crate::face_client::IdentityResolver;
use crate::heuristics;
use crate::models::FrameAnalysis;
use crate::presence::PresenceTracker;
use crate::realtime_hub::{HubMessage, RealtimeHub};
use crate::roster::Roster;
use crate::state::MonitorPolicy;
use crate::status::{MonitorSnapshot, StatusAggregator};
use crate::tracker::{ViolationKind, ViolationTracker};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Consecutive capture failures tolerated before the session ends
const MAX_CAPTURE_FAILURES: u32 = 5;

/// MonitorLoop instance
pub struct MonitorLoop {
    roster: Arc<Roster>,
    frames: Arc<dyn FrameSource>,
    resolver: Arc<dyn IdentityResolver>,
    tracker: Arc<ViolationTracker>,
    presence: Arc<PresenceTracker>,
    actuator: Arc<ActuatorBridge>,
    environment: Arc<EnvironmentPoller>,
    status: Arc<StatusAggregator>,
    realtime: Arc<RealtimeHub>,
    policy: MonitorPolicy,
    running: Arc<RwLock<bool>>,
}

impl MonitorLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        roster: Arc<Roster>,
        frames: Arc<dyn FrameSource>,
        resolver: Arc<dyn IdentityResolver>,
        tracker: Arc<ViolationTracker>,
        presence: Arc<PresenceTracker>,
        actuator: Arc<ActuatorBridge>,
        environment: Arc<EnvironmentPoller>,
        status: Arc<StatusAggregator>,
        realtime: Arc<RealtimeHub>,
        policy: MonitorPolicy,
    ) -> Self {
        Self {
            roster,
            frames,
            resolver,
            tracker,
            presence,
            actuator,
            environment,
            status,
            realtime,
            policy,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Whether the loop task is active
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Start the monitoring loop task
    pub async fn start(self: &Arc<Self>) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Monitor loop already running");
                return;
            }
            *running = true;
        }

        tracing::info!(roster = self.roster.len(), "Starting monitor loop");

        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.run().await;
            let mut running = monitor.running.write().await;
            *running = false;
            tracing::info!("Monitor loop stopped");
        });
    }

    /// Request loop termination
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping monitor loop");
    }

    async fn run(&self) {
        let mut capture_failures: u32 = 0;

        loop {
            {
                let is_running = self.running.read().await;
                if !*is_running {
                    break;
                }
            }

            let frame = match self.frames.next_frame().await {
                Ok(Some(frame)) => {
                    capture_failures = 0;
                    frame
                }
                Ok(None) => {
                    tracing::info!("Frame source exhausted, ending session");
                    break;
                }
                Err(e) => {
                    capture_failures += 1;
                    tracing::warn!(
                        error = %e,
                        consecutive = capture_failures,
                        "Frame capture failed"
                    );
                    if capture_failures >= MAX_CAPTURE_FAILURES {
                        tracing::error!("Frame source unrecoverable, ending session");
                        break;
                    }
                    tokio::time::sleep(self.policy.frame_delay).await;
                    continue;
                }
            };

            match self.resolver.analyze(&frame).await {
                Ok(analysis) => self.process_analysis(analysis).await,
                Err(e) => {
                    // One bad frame does not end the session
                    tracing::warn!(error = %e, "Frame analysis failed, skipping frame");
                }
            }

            tokio::time::sleep(self.policy.frame_delay).await;
        }
    }

    /// Run heuristics, trackers and snapshot publication for one frame
    async fn process_analysis(&self, analysis: FrameAnalysis) {
        let mut recognized: Vec<String> = Vec::new();

        for face in &analysis.faces {
            let person = match face.identity.as_deref() {
                Some(id) if self.roster.contains(id) => id,
                Some(id) => {
                    tracing::debug!(identity = %id, "Face matched an unenrolled identity");
                    continue;
                }
                None => {
                    tracing::debug!(confidence = face.confidence, "Unrecognized face");
                    continue;
                }
            };
            recognized.push(person.to_string());

            if heuristics::is_turned(&face.bbox, &self.policy) {
                self.report(person, ViolationKind::LookingAway).await;
            }

            if heuristics::is_slumped(&face.bbox, analysis.frame_height, &self.policy) {
                self.report(person, ViolationKind::Sleeping).await;
            }

            let observed = heuristics::classify_uniform(
                &face.bbox,
                analysis.frame_width,
                analysis.frame_height,
                face.torso_white_fraction,
                &self.policy,
            );
            if let Some(expected) = self.roster.expected_uniform(person) {
                if heuristics::uniform_mismatch(observed, expected) {
                    self.report(person, ViolationKind::UniformMismatch).await;
                }
            }
        }

        let (presence_state, alarm) = self.presence.observe(recognized).await;
        if let Some(alarm) = alarm {
            tracing::warn!(absent = ?alarm.absent, "Absence alarm fired");
            self.realtime
                .broadcast(HubMessage::AbsenceAlert(alarm))
                .await;
        }

        let snapshot = MonitorSnapshot {
            present: presence_state.present,
            absent: presence_state.absent,
            violations: self.tracker.active_by_person().await,
            environment: self.environment.latest().await,
            timestamp: Some(Utc::now()),
        };
        self.status.publish(snapshot).await;
    }

    /// Report one observed violation; emits and pulses only on activation
    async fn report(&self, person: &str, kind: ViolationKind) {
        if let Some(event) = self.tracker.report(person, kind).await {
            if kind.is_cheating() {
                self.actuator
                    .pulse(SignalChannel::Warning, self.policy.warning_dwell)
                    .await;
            }
            self.realtime.broadcast(HubMessage::Violation(event)).await;
        }
    }
}
