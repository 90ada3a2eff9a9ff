//! Shared models and types for classwatch
//!
//! This module contains types shared across multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub face_service_connected: bool,
    pub monitor_running: bool,
    pub roster_size: usize,
}

/// Axis-aligned face bounding box in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width/height aspect ratio. Zero height yields zero, not a NaN.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }
}

/// One detected face in one frame, as returned by the face service.
///
/// Ephemeral: created and discarded every frame, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bbox: BBox,
    /// Roster identity, or `None` when the match failed the service's
    /// acceptance threshold
    pub identity: Option<String>,
    pub confidence: f32,
    /// Fraction of compliant-signature ("white") pixels the service measured
    /// over the torso sample below this face, if it computed one
    #[serde(default)]
    pub torso_white_fraction: Option<f32>,
}

/// Result of analyzing a single frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub frame_width: u32,
    pub frame_height: u32,
    pub faces: Vec<FaceObservation>,
}
