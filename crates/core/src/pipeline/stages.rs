use thiserror::Error;

use crate::alignment::domain::aligned_face::{mesh_crop_transform, AlignedFace};
use crate::alignment::domain::umeyama::estimate_similarity;
use crate::compositing::domain::composite_job::CompositeJob;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::heatmap_decoder::HeatmapDecoder;
use crate::inference::domain::face_models::{
    FaceDetectorModel, FaceMeshModel, FaceSwapModel, ModelError,
};
use crate::shared::constants::{DETECTOR_INPUT_HEIGHT, DETECTOR_INPUT_WIDTH, MESH_INPUT_SIZE};
use crate::shared::frame::Frame;
use crate::shared::warp::{resize_frame, warp_frame_into, warp_frame_to_patch};

/// Why a frame left the stage chain early.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("unsupported {0}-channel frame, expected RGB or RGBA")]
    UnsupportedFrame(u8),
    #[error("eye landmarks coincide, mesh crop has no orientation")]
    DegenerateLandmarks,
    #[error("landmark alignment is degenerate")]
    DegenerateAlignment,
    #[error("compositing failed: {0}")]
    Composite(String),
    #[error("cancelled")]
    Cancelled,
}

/// Runs the detector on a 640×480 copy of the frame and decodes the
/// strongest face, if any.
pub fn detect(
    detector: &dyn FaceDetectorModel,
    decoder: &HeatmapDecoder,
    frame: &Frame,
) -> Result<Option<Detection>, StageError> {
    let input = resize_frame(frame, DETECTOR_INPUT_WIDTH, DETECTOR_INPUT_HEIGHT);
    let output = detector.detect(input.view())?;
    Ok(decoder.decode(&output, frame.width(), frame.height())?)
}

/// Fits the mesh landmarks of `detection` to the canonical `template`.
pub fn align(
    mesh: &dyn FaceMeshModel,
    frame: &Frame,
    detection: &Detection,
    template: &[[f64; 2]],
) -> Result<AlignedFace, StageError> {
    let frame_to_crop = mesh_crop_transform(detection);
    let crop_to_frame = frame_to_crop.inverse();
    if !crop_to_frame.is_finite() {
        return Err(StageError::DegenerateLandmarks);
    }

    let crop = warp_frame_to_patch(frame, &crop_to_frame, MESH_INPUT_SIZE, 1.0 / 255.0);
    let points = mesh.landmarks(crop.view())?;

    let landmarks: Vec<[f64; 2]> = points
        .iter()
        .map(|p| {
            let (x, y) = crop_to_frame.apply(p[0] as f64, p[1] as f64);
            [x, y]
        })
        .collect();

    let to_canonical = estimate_similarity(&landmarks, template);
    let to_frame = to_canonical.inverse();
    if !to_canonical.is_finite() || !to_frame.is_finite() {
        return Err(StageError::DegenerateAlignment);
    }

    Ok(AlignedFace {
        bounds: detection.bounds,
        landmarks,
        to_frame,
    })
}

/// Cuts the canonical patch out of the frame and runs the swap model on it.
pub fn swap(
    model: &dyn FaceSwapModel,
    frame: &Frame,
    face: &AlignedFace,
    job: &mut CompositeJob,
) -> Result<(), StageError> {
    warp_frame_into(frame, &face.to_frame, 1.0 / 255.0, job.source.view_mut());
    model.swap(job.source.view(), job.generated.view_mut(), job.mask.view_mut())?;
    Ok(())
}
