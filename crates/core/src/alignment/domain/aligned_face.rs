use crate::detection::domain::detection::{Detection, LEFT_EYE, NOSE, RIGHT_EYE};
use crate::shared::affine_transform::AffineTransform;
use crate::shared::bounds::BoundingBox;
use crate::shared::constants::{MESH_CROP_COVERAGE, MESH_INPUT_SIZE};

/// A face whose dense landmarks have been fitted to the canonical template.
#[derive(Clone, Debug)]
pub struct AlignedFace {
    /// Smoothed detection bounds in frame pixels.
    pub bounds: BoundingBox,
    /// Mesh landmarks in frame pixels.
    pub landmarks: Vec<[f64; 2]>,
    /// Canonical patch coordinates to frame pixels.
    pub to_frame: AffineTransform,
}

/// Frame → mesh-crop similarity derived from the eyes and the nose.
///
/// The crop's x-axis runs along the eye vector, the nose lands on the crop
/// center, and the longer side of the detection box times
/// [`MESH_CROP_COVERAGE`] spans the crop. Coincident eyes give the NaN
/// sentinel.
pub fn mesh_crop_transform(detection: &Detection) -> AffineTransform {
    let (lx, ly) = detection.landmark(LEFT_EYE);
    let (rx, ry) = detection.landmark(RIGHT_EYE);
    let (nx, ny) = detection.landmark(NOSE);

    let extent = detection.bounds.width().max(detection.bounds.height()) as f64;
    let (ex, ey) = ((rx - lx) as f64, (ry - ly) as f64);
    let eye_distance = ex.hypot(ey);
    if extent <= 0.0 || eye_distance <= f64::EPSILON {
        return AffineTransform::nan();
    }

    let size = MESH_INPUT_SIZE as f64;
    let scale = size / (MESH_CROP_COVERAGE * extent);
    let (ax, ay) = (scale * ex / eye_distance, scale * ey / eye_distance);
    let (bx, by) = (-ay, ax);
    let (nx, ny) = (nx as f64, ny as f64);
    let half = size / 2.0;

    AffineTransform::from_rows(
        [ax, ay, half - (ax * nx + ay * ny)],
        [bx, by, half - (bx * nx + by * ny)],
    )
}
