use crate::detection::domain::detection::Detection;
use crate::shared::bounds::BoundingBox;
use crate::shared::constants::{DEFAULT_OVERLAP_THRESHOLD, DEFAULT_SMOOTHING_LERP};

/// One-slot face memory for a single worker.
///
/// When a new detection overlaps the remembered bounds by more than
/// `threshold` (intersection over the new box's own area), its box is pulled
/// toward the remembered one: `new * (1 - lerp) + remembered * lerp`.
/// Landmarks are never smoothed.
pub struct FaceTracker {
    threshold: f64,
    lerp: f64,
    remembered: Option<BoundingBox>,
}

impl FaceTracker {
    pub fn new(threshold: f64, lerp: f64) -> Self {
        Self {
            threshold,
            lerp,
            remembered: None,
        }
    }

    pub fn smooth(&self, mut detection: Detection) -> Detection {
        let Some(previous) = self.remembered else {
            return detection;
        };
        if detection.bounds.overlap_ratio(&previous) > self.threshold {
            detection.bounds = detection.bounds.lerp(&previous, self.lerp);
        }
        detection
    }

    pub fn remember(&mut self, bounds: BoundingBox) {
        self.remembered = Some(bounds);
    }

    pub fn forget(&mut self) {
        self.remembered = None;
    }

    pub fn remembered(&self) -> Option<BoundingBox> {
        self.remembered
    }
}

impl Default for FaceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAP_THRESHOLD, DEFAULT_SMOOTHING_LERP)
    }
}
