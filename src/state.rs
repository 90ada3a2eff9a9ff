//! Application state
//!
//! Holds all shared components and state

use crate::actuator::ActuatorBridge;
use crate::environment::EnvironmentPoller;
use crate::face_client::IdentityResolver;
use crate::monitor::MonitorLoop;
use crate::presence::PresenceTracker;
use crate::realtime_hub::RealtimeHub;
use crate::roster::Roster;
use crate::status::StatusAggregator;
use crate::tracker::ViolationTracker;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Face analysis service URL
    pub face_service_url: String,
    /// Camera snapshot URL (one JPEG per GET)
    pub camera_url: String,
    /// ESP actuator base URL
    pub esp_url: String,
    /// ESP basic auth username
    pub esp_username: String,
    /// ESP basic auth password
    pub esp_password: String,
    /// Enrollment directory (per-person exemplar dirs + metadata.json)
    pub roster_dir: PathBuf,
    /// Heuristic and alarm thresholds
    pub policy: MonitorPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT", 5000),
            face_service_url: std::env::var("FACE_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:9100".to_string()),
            camera_url: std::env::var("CAMERA_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8081/snapshot.jpg".to_string()),
            esp_url: std::env::var("ESP_URL")
                .unwrap_or_else(|_| "http://192.168.1.100".to_string()),
            esp_username: std::env::var("ESP_USER").unwrap_or_else(|_| "admin".to_string()),
            esp_password: std::env::var("ESP_PASS").unwrap_or_else(|_| "1234".to_string()),
            roster_dir: std::env::var("ROSTER_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("faces_db")),
            policy: MonitorPolicy::from_env(),
        }
    }
}

/// Tunable thresholds for the monitoring pipeline.
///
/// All values are deployment configuration, overridable via environment.
#[derive(Debug, Clone)]
pub struct MonitorPolicy {
    /// Lower edge of the frontal-face aspect ratio band (inclusive)
    pub orientation_min: f32,
    /// Upper edge of the frontal-face aspect ratio band (inclusive)
    pub orientation_max: f32,
    /// Fraction of frame height below which a head counts as slumped
    pub posture_fraction: f32,
    /// Minimum compliant-pixel fraction for a "white" uniform classification
    pub uniform_ratio: f32,
    /// Height in pixels of the torso sample region below the face box
    pub torso_sample_depth: f32,
    /// Absent-count at which the absence alarm fires
    pub absence_threshold: usize,
    /// Temperature above which the environment alert pulses
    pub temperature_threshold: f32,
    /// Climate sensor poll interval
    pub climate_poll_interval: Duration,
    /// How long a warning pulse stays on before auto-clearing
    pub warning_dwell: Duration,
    /// Delay between processed frames
    pub frame_delay: Duration,
}

impl MonitorPolicy {
    pub fn from_env() -> Self {
        Self {
            orientation_min: env_parse("ORIENTATION_MIN", 0.75),
            orientation_max: env_parse("ORIENTATION_MAX", 1.3),
            posture_fraction: env_parse("POSTURE_FRACTION", 0.6),
            uniform_ratio: env_parse("UNIFORM_RATIO", 0.3),
            torso_sample_depth: env_parse("TORSO_SAMPLE_DEPTH", 60.0),
            absence_threshold: env_parse("ABSENT_THRESHOLD", 1),
            temperature_threshold: env_parse("TEMP_THRESHOLD", 30.0),
            climate_poll_interval: Duration::from_secs(env_parse("CLIMATE_POLL_SEC", 5)),
            warning_dwell: Duration::from_secs(env_parse("WARNING_DWELL_SEC", 3)),
            frame_delay: Duration::from_millis(env_parse("FRAME_DELAY_MS", 100)),
        }
    }
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            orientation_min: 0.75,
            orientation_max: 1.3,
            posture_fraction: 0.6,
            uniform_ratio: 0.3,
            torso_sample_depth: 60.0,
            absence_threshold: 1,
            temperature_threshold: 30.0,
            climate_poll_interval: Duration::from_secs(5),
            warning_dwell: Duration::from_secs(3),
            frame_delay: Duration::from_millis(100),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub roster: Arc<Roster>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub tracker: Arc<ViolationTracker>,
    pub presence: Arc<PresenceTracker>,
    pub status: Arc<StatusAggregator>,
    pub realtime: Arc<RealtimeHub>,
    pub actuator: Arc<ActuatorBridge>,
    pub environment: Arc<EnvironmentPoller>,
    pub monitor: Arc<MonitorLoop>,
}
