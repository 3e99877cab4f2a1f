use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array3, ArrayView3, ArrayViewD};

use crate::inference::domain::face_models::{DetectorOutput, FaceDetectorModel, ModelError};
use crate::inference::infrastructure::{
    backend, bgr_batch, expect_shape, load_session, lock_session,
};
use crate::shared::constants::{DETECTOR_INPUT_HEIGHT, DETECTOR_INPUT_WIDTH};

const OUTPUT_COUNT: usize = 4;

/// CenterFace detector using ONNX Runtime via `ort`.
///
/// Single-scale anchor-free detector: one heatmap plus per-cell scale,
/// offset and landmark regressions, all at 1/4 input resolution.
pub struct OnnxCenterFace {
    session: Mutex<ort::session::Session>,
}

impl OnnxCenterFace {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        log::info!("Loaded detector model {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl FaceDetectorModel for OnnxCenterFace {
    fn detect(&self, image: ArrayView3<'_, f32>) -> Result<DetectorOutput, ModelError> {
        expect_shape(
            "detector input",
            image.dim(),
            (DETECTOR_INPUT_HEIGHT, DETECTOR_INPUT_WIDTH, 3),
        )?;

        let input_value = ort::value::Tensor::from_array(bgr_batch(image)).map_err(backend)?;
        let mut session = lock_session(&self.session)?;
        let outputs = session.run(ort::inputs![input_value]).map_err(backend)?;

        if outputs.len() < OUTPUT_COUNT {
            return Err(ModelError::OutputCount {
                model: "CenterFace",
                expected: OUTPUT_COUNT,
                actual: outputs.len(),
            });
        }

        let heatmap = grid(outputs[0].try_extract_array::<f32>().map_err(backend)?, 1)?;
        let (_, h, w) = heatmap.dim();
        Ok(DetectorOutput {
            heatmap: heatmap.into_shape_with_order((h, w))?,
            scale: grid(outputs[1].try_extract_array::<f32>().map_err(backend)?, 2)?,
            offset: grid(outputs[2].try_extract_array::<f32>().map_err(backend)?, 2)?,
            landmarks: grid(outputs[3].try_extract_array::<f32>().map_err(backend)?, 10)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Output decoding
// ---------------------------------------------------------------------------

/// `[1, C, H, W]` output to an owned `(C, H, W)` grid.
fn grid(view: ArrayViewD<'_, f32>, channels: usize) -> Result<Array3<f32>, ModelError> {
    let shape = view.shape();
    if shape.len() != 4 || shape[0] != 1 || shape[1] != channels {
        return Err(ModelError::UnexpectedShape(format!(
            "detector output {shape:?}, expected [1, {channels}, H, W]"
        )));
    }
    let (h, w) = (shape[2], shape[3]);
    Ok(view
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((channels, h, w))?)
}
