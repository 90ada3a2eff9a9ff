//! EnvironmentPoller - Ambient Climate Sampling
//!
//! ## Responsibilities
//!
//! - Poll the climate sensor on a fixed interval, independent of frame rate
//! - Keep the last good reading available when a poll fails
//! - Pulse the environment alert when temperature crosses the threshold

use crate::actuator::{ActuatorBridge, ClimateReading, SignalChannel};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;

/// EnvironmentPoller instance
pub struct EnvironmentPoller {
    actuator: Arc<ActuatorBridge>,
    poll_interval: Duration,
    temperature_threshold: f32,
    alert_dwell: Duration,
    latest: Arc<RwLock<Option<ClimateReading>>>,
    running: Arc<RwLock<bool>>,
}

impl EnvironmentPoller {
    pub fn new(
        actuator: Arc<ActuatorBridge>,
        poll_interval: Duration,
        temperature_threshold: f32,
        alert_dwell: Duration,
    ) -> Self {
        Self {
            actuator,
            poll_interval,
            temperature_threshold,
            alert_dwell,
            latest: Arc::new(RwLock::new(None)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Last successful reading, possibly stale
    pub async fn latest(&self) -> Option<ClimateReading> {
        *self.latest.read().await
    }

    /// Start the polling task
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Environment poller already running");
                return;
            }
            *running = true;
        }

        tracing::info!(
            interval_sec = self.poll_interval.as_secs(),
            threshold = self.temperature_threshold,
            "Starting environment poller"
        );

        let actuator = self.actuator.clone();
        let latest = self.latest.clone();
        let running = self.running.clone();
        let poll_interval = self.poll_interval;
        let threshold = self.temperature_threshold;
        let dwell = self.alert_dwell;

        tokio::spawn(async move {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                {
                    let is_running = running.read().await;
                    if !*is_running {
                        break;
                    }
                }

                match actuator.read_climate().await {
                    Ok(reading) => {
                        tracing::debug!(
                            temperature = reading.temperature,
                            humidity = reading.humidity,
                            "Climate sampled"
                        );
                        {
                            let mut latest = latest.write().await;
                            *latest = Some(reading);
                        }
                        if reading.temperature > threshold {
                            tracing::warn!(
                                temperature = reading.temperature,
                                threshold,
                                "Temperature over threshold"
                            );
                            actuator.pulse(SignalChannel::Alert, dwell).await;
                        }
                    }
                    Err(e) => {
                        // Previous reading stays available
                        tracing::debug!(error = %e, "Climate poll failed");
                    }
                }
            }

            tracing::info!("Environment poller stopped");
        });
    }

    /// Stop the polling task
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
    }
}
