//! Stub models shared by the pipeline tests.

use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use ndarray::{Array2, Array3, ArrayView3, ArrayViewMut2, ArrayViewMut3};

use crate::alignment::domain::canonical_landmarks::canonical_template;
use crate::inference::domain::face_models::{
    DetectorOutput, FaceDetectorModel, FaceMeshModel, FaceSwapModel, ModelError, ModelSet,
};
use crate::shared::constants::{
    DETECTOR_INPUT_HEIGHT, DETECTOR_INPUT_WIDTH, DETECTOR_STRIDE, MESH_INPUT_SIZE,
};
use crate::shared::frame::Frame;

const GRID_W: usize = DETECTOR_INPUT_WIDTH / DETECTOR_STRIDE as usize;
const GRID_H: usize = DETECTOR_INPUT_HEIGHT / DETECTOR_STRIDE as usize;

/// RGBA frame with a diagonal gradient and opaque alpha.
pub fn face_frame(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                (x % 256) as u8,
                (y % 256) as u8,
                ((x + y) % 256) as u8,
                255,
            ]);
        }
    }
    Frame::new(data, width, height, 4, 0)
}

enum DetectorMode {
    Empty,
    Face,
    Fail,
}

/// Detector whose single face sits at the frame center, spanning
/// 100×120 pixels of a 320×240 frame.
pub struct StubDetector {
    mode: DetectorMode,
    gate: Option<Receiver<()>>,
    pub seen_shape: Mutex<Option<(usize, usize, usize)>>,
}

impl StubDetector {
    fn with_mode(mode: DetectorMode) -> Self {
        Self {
            mode,
            gate: None,
            seen_shape: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::with_mode(DetectorMode::Empty)
    }

    pub fn face() -> Self {
        Self::with_mode(DetectorMode::Face)
    }

    pub fn failing() -> Self {
        Self::with_mode(DetectorMode::Fail)
    }

    /// Finds nothing, but each call first waits for one message on the gate.
    /// Dropping the sender opens the gate for good.
    pub fn gated() -> (Self, Sender<()>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut detector = Self::empty();
        detector.gate = Some(rx);
        (detector, tx)
    }
}

impl FaceDetectorModel for StubDetector {
    fn detect(&self, image: ArrayView3<'_, f32>) -> Result<DetectorOutput, ModelError> {
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        *self.seen_shape.lock().unwrap() = Some(image.dim());

        let mut output = DetectorOutput {
            heatmap: Array2::zeros((GRID_H, GRID_W)),
            scale: Array3::zeros((2, GRID_H, GRID_W)),
            offset: Array3::zeros((2, GRID_H, GRID_W)),
            landmarks: Array3::from_elem((10, GRID_H, GRID_W), 0.5),
        };

        match self.mode {
            DetectorMode::Empty => {}
            DetectorMode::Fail => return Err(ModelError::Backend("stub failure".into())),
            DetectorMode::Face => {
                let (cy, cx) = (GRID_H / 2 - 1, GRID_W / 2 - 1);
                output.heatmap[[cy, cx]] = 0.9;
                output.offset[[0, cy, cx]] = 0.5;
                output.offset[[1, cy, cx]] = 0.5;
                // Grid step is 2 px on a 320×240 frame.
                output.scale[[0, cy, cx]] = 60.0f32.ln();
                output.scale[[1, cy, cx]] = 50.0f32.ln();
                let points = [
                    (0.35, 0.35),
                    (0.65, 0.35),
                    (0.5, 0.55),
                    (0.38, 0.75),
                    (0.62, 0.75),
                ];
                for (i, (x, y)) in points.iter().enumerate() {
                    output.landmarks[[2 * i, cy, cx]] = *y;
                    output.landmarks[[2 * i + 1, cy, cx]] = *x;
                }
            }
        }
        Ok(output)
    }
}

/// Mesh model returning fixed crop-space points.
pub struct StubMesh {
    points: Vec<[f32; 3]>,
}

impl StubMesh {
    /// The canonical face laid out over the crop.
    pub fn template() -> Self {
        let points = canonical_template(MESH_INPUT_SIZE, 2.0)
            .into_iter()
            .map(|p| [p[0] as f32, p[1] as f32, 0.0])
            .collect();
        Self { points }
    }

    /// Every point on the crop center.
    pub fn collapsed() -> Self {
        let c = MESH_INPUT_SIZE as f32 / 2.0;
        Self {
            points: vec![[c, c, 0.0]; 468],
        }
    }
}

impl FaceMeshModel for StubMesh {
    fn landmarks(&self, _crop: ArrayView3<'_, f32>) -> Result<Vec<[f32; 3]>, ModelError> {
        Ok(self.points.clone())
    }
}

/// Swap model painting a flat face under a flat mask.
pub struct StubSwap {
    face: f32,
    mask: f32,
}

impl StubSwap {
    pub fn new(face: f32, mask: f32) -> Self {
        Self { face, mask }
    }
}

impl FaceSwapModel for StubSwap {
    fn swap(
        &self,
        _source: ArrayView3<'_, f32>,
        mut generated: ArrayViewMut3<'_, f32>,
        mut mask: ArrayViewMut2<'_, f32>,
    ) -> Result<(), ModelError> {
        generated.fill(self.face);
        mask.fill(self.mask);
        Ok(())
    }
}

pub fn models(detector: StubDetector) -> ModelSet {
    ModelSet::new(
        Box::new(detector),
        Box::new(StubMesh::template()),
        Box::new(StubSwap::new(1.0, 1.0)),
    )
}
