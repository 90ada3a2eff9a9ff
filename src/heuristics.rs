//! Heuristics - Per-Face Violation Signals
//!
//! ## Responsibilities
//!
//! - Head orientation check (aspect ratio outside the frontal band)
//! - Posture check (head abnormally low in frame)
//! - Uniform classification from the torso color sample
//!
//! All predicates are pure and stateless; thresholds come from
//! [`MonitorPolicy`]. A frontal face keeps a roughly fixed width/height
//! ratio, so an extreme deviation means the head is turned away.

use crate::models::BBox;
use crate::state::MonitorPolicy;

/// Uniform classification for one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformClass {
    /// Compliant color signature dominates the torso sample
    White,
    /// Sample present but below the compliant ratio
    Other,
    /// Sample region out of frame or no sample available
    Unknown,
}

impl UniformClass {
    pub fn as_label(&self) -> Option<&'static str> {
        match self {
            UniformClass::White => Some("white"),
            UniformClass::Other => Some("other"),
            UniformClass::Unknown => None,
        }
    }
}

/// True when the face box ratio falls outside the frontal band.
///
/// Ratios exactly on the band edges are frontal, not turned.
pub fn is_turned(bbox: &BBox, policy: &MonitorPolicy) -> bool {
    let ratio = bbox.aspect_ratio();
    ratio < policy.orientation_min || ratio > policy.orientation_max
}

/// True when the head sits abnormally low in the frame (slumped/sleeping).
pub fn is_slumped(bbox: &BBox, frame_height: u32, policy: &MonitorPolicy) -> bool {
    bbox.y > frame_height as f32 * policy.posture_fraction
}

/// Classify the torso sample just below the face box.
///
/// The sample rect spans the face width and `torso_sample_depth` pixels
/// starting at the bottom edge of the box. If any part of it falls outside
/// the frame, or the service supplied no measurement, the result is
/// `Unknown`. A fraction exactly at the compliant ratio is not compliant.
pub fn classify_uniform(
    bbox: &BBox,
    frame_width: u32,
    frame_height: u32,
    white_fraction: Option<f32>,
    policy: &MonitorPolicy,
) -> UniformClass {
    let sample_top = bbox.y + bbox.height;
    let sample_bottom = sample_top + policy.torso_sample_depth;

    let in_bounds = bbox.x >= 0.0
        && bbox.x + bbox.width <= frame_width as f32
        && sample_top >= 0.0
        && sample_bottom <= frame_height as f32;
    if !in_bounds {
        return UniformClass::Unknown;
    }

    match white_fraction {
        Some(fraction) if fraction > policy.uniform_ratio => UniformClass::White,
        Some(_) => UniformClass::Other,
        None => UniformClass::Unknown,
    }
}

/// True when the observed uniform class contradicts the expected label.
///
/// `Unknown` never counts as a mismatch: a degenerate sample must not
/// produce a false positive.
pub fn uniform_mismatch(observed: UniformClass, expected: &str) -> bool {
    match observed.as_label() {
        Some(label) => label != expected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> MonitorPolicy {
        MonitorPolicy::default()
    }

    fn face(x: f32, y: f32, w: f32, h: f32) -> BBox {
        BBox::new(x, y, w, h)
    }

    #[test]
    fn orientation_band_edges_are_frontal() {
        // ratio exactly 0.75
        assert!(!is_turned(&face(0.0, 0.0, 75.0, 100.0), &policy()));
        // ratio exactly 1.3
        assert!(!is_turned(&face(0.0, 0.0, 130.0, 100.0), &policy()));
    }

    #[test]
    fn orientation_outside_band_is_turned() {
        assert!(is_turned(&face(0.0, 0.0, 74.0, 100.0), &policy()));
        assert!(is_turned(&face(0.0, 0.0, 131.0, 100.0), &policy()));
        assert!(is_turned(&face(0.0, 0.0, 150.0, 100.0), &policy()));
    }

    #[test]
    fn degenerate_box_is_turned() {
        assert!(is_turned(&face(0.0, 0.0, 50.0, 0.0), &policy()));
    }

    #[test]
    fn posture_threshold_is_strict() {
        let frame_h = 720;
        // y exactly at 0.6 * 720 = 432 is acceptable
        assert!(!is_slumped(&face(0.0, 432.0, 80.0, 90.0), frame_h, &policy()));
        assert!(is_slumped(&face(0.0, 433.0, 80.0, 90.0), frame_h, &policy()));
    }

    #[test]
    fn uniform_fraction_at_ratio_is_not_compliant() {
        let bbox = face(100.0, 100.0, 80.0, 90.0);
        let got = classify_uniform(&bbox, 1280, 720, Some(0.3), &policy());
        assert_eq!(got, UniformClass::Other);
    }

    #[test]
    fn uniform_fraction_above_ratio_is_compliant() {
        let bbox = face(100.0, 100.0, 80.0, 90.0);
        let got = classify_uniform(&bbox, 1280, 720, Some(0.31), &policy());
        assert_eq!(got, UniformClass::White);
    }

    #[test]
    fn sample_region_below_frame_is_unknown() {
        // face bottom at y=700, sample extends to 760 > 720
        let bbox = face(100.0, 610.0, 80.0, 90.0);
        let got = classify_uniform(&bbox, 1280, 720, Some(0.9), &policy());
        assert_eq!(got, UniformClass::Unknown);
    }

    #[test]
    fn missing_fraction_is_unknown() {
        let bbox = face(100.0, 100.0, 80.0, 90.0);
        let got = classify_uniform(&bbox, 1280, 720, None, &policy());
        assert_eq!(got, UniformClass::Unknown);
    }

    #[test]
    fn unknown_class_never_mismatches() {
        assert!(!uniform_mismatch(UniformClass::Unknown, "white"));
        assert!(uniform_mismatch(UniformClass::Other, "white"));
        assert!(!uniform_mismatch(UniformClass::White, "white"));
        assert!(uniform_mismatch(UniformClass::White, "other"));
    }
}
