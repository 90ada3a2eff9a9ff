//! ActuatorBridge - External Warning Device
//!
//! ## Responsibilities
//!
//! - Best-effort signal dispatch to the ESP warning device (red/yellow LEDs)
//! - Timed pulses with deferred auto-clear (never an inline wait)
//! - Climate sensor reads
//!
//! Every device failure is swallowed: the monitoring pipeline must never
//! stall or fail because the actuator is unreachable.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Independent indicator channels on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalChannel {
    /// Red LED, pulsed on cheating-class violations
    Warning,
    /// Yellow LED, pulsed on environment threshold breach
    Alert,
}

/// Full device signal state; the device only accepts complete writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    pub warning: bool,
    pub alert: bool,
}

/// Temperature/humidity reading from the device sensor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClimateReading {
    pub temperature: f32,
    pub humidity: f32,
    pub sampled_at: DateTime<Utc>,
}

/// Outbound device capability.
///
/// Implemented by [`EspClient`] in production and by mocks in tests.
#[async_trait]
pub trait ActuatorPort: Send + Sync {
    async fn set_signals(&self, state: SignalState) -> Result<()>;
    async fn read_climate(&self) -> Result<ClimateReading>;
}

/// HTTP client for the ESP8266 indicator/sensor board
pub struct EspClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl EspClient {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            username,
            password,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DhtResponse {
    temp: f32,
    humidity: f32,
}

#[async_trait]
impl ActuatorPort for EspClient {
    async fn set_signals(&self, state: SignalState) -> Result<()> {
        self.client
            .post(format!("{}/led", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .timeout(Duration::from_secs(1))
            .json(&serde_json::json!({
                "red": state.warning,
                "yellow": state.alert,
            }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Actuator(format!("led write rejected: {}", e)))?;
        Ok(())
    }

    async fn read_climate(&self) -> Result<ClimateReading> {
        let response: DhtResponse = self
            .client
            .get(format!("{}/dht11", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Actuator(format!("sensor read rejected: {}", e)))?
            .json()
            .await?;

        Ok(ClimateReading {
            temperature: response.temp,
            humidity: response.humidity,
            sampled_at: Utc::now(),
        })
    }
}

/// ActuatorBridge instance.
///
/// Tracks the desired state of both channels so a pulse on one never
/// clobbers the other, and keeps a cancellable handle per channel so a
/// re-pulse restarts the dwell instead of stacking clears.
pub struct ActuatorBridge {
    port: Arc<dyn ActuatorPort>,
    state: Mutex<SignalState>,
    warning_clear: Mutex<Option<JoinHandle<()>>>,
    alert_clear: Mutex<Option<JoinHandle<()>>>,
}

impl ActuatorBridge {
    pub fn new(port: Arc<dyn ActuatorPort>) -> Self {
        Self {
            port,
            state: Mutex::new(SignalState::default()),
            warning_clear: Mutex::new(None),
            alert_clear: Mutex::new(None),
        }
    }

    /// Set one channel, preserving the other. Failures are swallowed.
    pub async fn set(&self, channel: SignalChannel, on: bool) {
        let state = {
            let mut state = self.state.lock().await;
            match channel {
                SignalChannel::Warning => state.warning = on,
                SignalChannel::Alert => state.alert = on,
            }
            *state
        };

        if let Err(e) = self.port.set_signals(state).await {
            tracing::warn!(error = %e, "Actuator signal dispatch failed");
        }
    }

    /// Pulse one channel on for `dwell`, clearing it from a deferred task.
    ///
    /// A pulse while the channel is already on cancels the pending clear
    /// and restarts the dwell.
    pub async fn pulse(self: &Arc<Self>, channel: SignalChannel, dwell: Duration) {
        self.set(channel, true).await;

        let bridge = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            bridge.set(channel, false).await;
        });

        let slot = match channel {
            SignalChannel::Warning => &self.warning_clear,
            SignalChannel::Alert => &self.alert_clear,
        };
        let mut slot = slot.lock().await;
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Read the climate sensor through the port
    pub async fn read_climate(&self) -> Result<ClimateReading> {
        self.port.read_climate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingPort {
        writes: Mutex<Vec<SignalState>>,
    }

    impl RecordingPort {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                writes: Mutex::new(Vec::new()),
            })
        }

        async fn last(&self) -> Option<SignalState> {
            self.writes.lock().await.last().copied()
        }
    }

    #[async_trait]
    impl ActuatorPort for RecordingPort {
        async fn set_signals(&self, state: SignalState) -> Result<()> {
            self.writes.lock().await.push(state);
            Ok(())
        }

        async fn read_climate(&self) -> Result<ClimateReading> {
            Err(Error::Actuator("no sensor".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_sets_then_clears_after_dwell() {
        let port = RecordingPort::new();
        let bridge = Arc::new(ActuatorBridge::new(port.clone() as Arc<dyn ActuatorPort>));

        bridge.pulse(SignalChannel::Warning, Duration::from_secs(3)).await;
        assert_eq!(
            port.last().await,
            Some(SignalState {
                warning: true,
                alert: false
            })
        );

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(
            port.last().await,
            Some(SignalState {
                warning: false,
                alert: false
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repulse_restarts_dwell() {
        let port = RecordingPort::new();
        let bridge = Arc::new(ActuatorBridge::new(port.clone() as Arc<dyn ActuatorPort>));

        bridge.pulse(SignalChannel::Warning, Duration::from_secs(3)).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        bridge.pulse(SignalChannel::Warning, Duration::from_secs(3)).await;

        // 2s after the re-pulse: first clear would have hit by now, but it
        // was cancelled
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(port.last().await.map(|s| s.warning), Some(true));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(port.last().await.map(|s| s.warning), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_channels_are_independent() {
        let port = RecordingPort::new();
        let bridge = Arc::new(ActuatorBridge::new(port.clone() as Arc<dyn ActuatorPort>));

        bridge.pulse(SignalChannel::Warning, Duration::from_secs(10)).await;
        bridge.pulse(SignalChannel::Alert, Duration::from_secs(2)).await;
        assert_eq!(
            port.last().await,
            Some(SignalState {
                warning: true,
                alert: true
            })
        );

        // Alert clears first; warning stays up
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(
            port.last().await,
            Some(SignalState {
                warning: true,
                alert: false
            })
        );
    }

    struct FailingPort;

    #[async_trait]
    impl ActuatorPort for FailingPort {
        async fn set_signals(&self, _state: SignalState) -> Result<()> {
            Err(Error::Actuator("device unreachable".to_string()))
        }

        async fn read_climate(&self) -> Result<ClimateReading> {
            Err(Error::Actuator("device unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_port_failure_is_swallowed() {
        let bridge = Arc::new(ActuatorBridge::new(Arc::new(FailingPort)));
        // Must not panic or propagate
        bridge.set(SignalChannel::Warning, true).await;
        bridge.pulse(SignalChannel::Alert, Duration::from_millis(1)).await;
    }
}
