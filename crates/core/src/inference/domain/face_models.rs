use ndarray::{Array2, Array3, ArrayView3, ArrayViewMut2, ArrayViewMut3};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("inference failed: {0}")]
    Backend(String),
    #[error("{model} returned {actual} outputs, expected at least {expected}")]
    OutputCount {
        model: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unexpected tensor shape: {0}")]
    UnexpectedShape(String),
}

impl From<ndarray::ShapeError> for ModelError {
    fn from(e: ndarray::ShapeError) -> Self {
        ModelError::UnexpectedShape(e.to_string())
    }
}

/// Raw detector grids, all at 1/4 of the detector input resolution.
///
/// `scale` and `offset` hold two channels (y, x); `landmarks` holds ten
/// (y, x per landmark).
#[derive(Clone, Debug)]
pub struct DetectorOutput {
    pub heatmap: Array2<f32>,
    pub scale: Array3<f32>,
    pub offset: Array3<f32>,
    pub landmarks: Array3<f32>,
}

/// Face detector collaborator.
///
/// Input is a `480 × 640 × 3` RGB image with values in 0–255.
pub trait FaceDetectorModel: Send + Sync {
    fn detect(&self, image: ArrayView3<'_, f32>) -> Result<DetectorOutput, ModelError>;
}

/// Dense landmark collaborator.
///
/// Input is a `192 × 192 × 3` RGB crop with values in 0..1. Returns one
/// `(x, y, z)` per landmark in crop pixels.
pub trait FaceMeshModel: Send + Sync {
    fn landmarks(&self, crop: ArrayView3<'_, f32>) -> Result<Vec<[f32; 3]>, ModelError>;
}

/// Face-swap collaborator.
///
/// Reads a `224 × 224 × 3` canonical RGB patch (0..1) and writes the
/// generated face (same shape and range) and its soft mask (0..1).
pub trait FaceSwapModel: Send + Sync {
    fn swap(
        &self,
        source: ArrayView3<'_, f32>,
        generated: ArrayViewMut3<'_, f32>,
        mask: ArrayViewMut2<'_, f32>,
    ) -> Result<(), ModelError>;
}

/// The three collaborators a worker needs, shared by every worker.
pub struct ModelSet {
    pub detector: Box<dyn FaceDetectorModel>,
    pub mesh: Box<dyn FaceMeshModel>,
    pub swap: Box<dyn FaceSwapModel>,
}

impl ModelSet {
    pub fn new(
        detector: Box<dyn FaceDetectorModel>,
        mesh: Box<dyn FaceMeshModel>,
        swap: Box<dyn FaceSwapModel>,
    ) -> Self {
        Self {
            detector,
            mesh,
            swap,
        }
    }
}
