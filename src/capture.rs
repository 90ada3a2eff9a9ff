//! Capture - Frame Acquisition
//!
//! ## Responsibilities
//!
//! - Pull one JPEG frame at a time from the camera
//! - Signal end-of-stream so the monitor loop can terminate cleanly

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// One captured camera frame (JPEG bytes)
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            captured_at: Utc::now(),
        }
    }
}

/// Frame acquisition capability.
///
/// `Ok(None)` means the source is exhausted; the caller must stop and
/// release resources.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn next_frame(&self) -> Result<Option<Frame>>;
}

/// Frame source backed by a camera's HTTP snapshot endpoint
pub struct SnapshotFrameSource {
    client: reqwest::Client,
    camera_url: String,
}

impl SnapshotFrameSource {
    pub fn new(camera_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self { client, camera_url }
    }
}

#[async_trait]
impl FrameSource for SnapshotFrameSource {
    async fn next_frame(&self) -> Result<Option<Frame>> {
        let response = self
            .client
            .get(&self.camera_url)
            .send()
            .await
            .map_err(|e| Error::Capture(format!("snapshot request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Capture(format!(
                "camera returned {}",
                response.status()
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Capture(format!("snapshot body read failed: {}", e)))?;

        if data.is_empty() {
            return Err(Error::Capture("camera returned empty frame".to_string()));
        }

        Ok(Some(Frame::new(data.to_vec())))
    }
}
