//! FaceClient - Face Service Communication Adapter
//!
//! ## Responsibilities
//!
//! - Send captured frames to the external face-analysis service
//! - Parse detection + identification results
//! - Startup connectivity check
//!
//! The service owns face detection, identity classification against the
//! enrolled exemplars, and the torso color sampling. This adapter only
//! speaks the wire contract.

use crate::capture::Frame;
use crate::error::{Error, Result};
use crate::models::FrameAnalysis;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Identity resolution capability.
///
/// Implemented by [`FaceServiceClient`] in production and by mocks in tests.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Detect and identify all faces in one frame
    async fn analyze(&self, frame: &Frame) -> Result<FrameAnalysis>;

    /// True when the service is reachable and has a trained model loaded
    async fn health_check(&self) -> Result<bool>;
}

/// HTTP client for the face-analysis service
pub struct FaceServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl FaceServiceClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }
}

#[async_trait]
impl IdentityResolver for FaceServiceClient {
    async fn analyze(&self, frame: &Frame) -> Result<FrameAnalysis> {
        let part = Part::bytes(frame.data.clone())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| Error::Recognition(format!("multipart build failed: {}", e)))?;
        let form = Form::new().part("frame", part);

        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Recognition(format!(
                "face service returned {}",
                response.status()
            )));
        }

        let analysis: FrameAnalysis = response.json().await?;
        tracing::debug!(faces = analysis.faces.len(), "Frame analyzed");
        Ok(analysis)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}
