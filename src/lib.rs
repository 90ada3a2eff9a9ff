//! classwatch - Classroom Monitoring Server
//!
//! ## Architecture (9 Components)
//!
//! 1. Roster - enrolled persons + expected uniform labels (SSoT for identity)
//! 2. SnapshotFrameSource - frame capture from the classroom camera
//! 3. FaceServiceClient - external face detection/identification adapter
//! 4. Heuristics - per-face orientation/posture/uniform predicates
//! 5. ViolationTracker - per-(person, kind) dedup ledger
//! 6. PresenceTracker - per-frame attendance + one-shot absence alarm
//! 7. ActuatorBridge / EnvironmentPoller - ESP device signals and climate
//! 8. StatusAggregator - atomically published monitor snapshot
//! 9. MonitorLoop / WebAPI / RealtimeHub - pipeline + REST/WebSocket surface
//!
//! ## Design Principles
//!
//! - The monitor loop exclusively owns live mutable state; consumers only
//!   read published snapshots and hub events
//! - External capabilities (camera, face service, actuator) sit behind
//!   traits with fixed contracts so tests substitute mocks
//! - Device side channels are best-effort; their failures never reach the
//!   pipeline

pub mod actuator;
pub mod capture;
pub mod environment;
pub mod error;
pub mod face_client;
pub mod heuristics;
pub mod models;
pub mod monitor;
pub mod presence;
pub mod realtime_hub;
pub mod roster;
pub mod state;
pub mod status;
pub mod tracker;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
