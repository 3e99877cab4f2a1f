use std::path::Path;
use std::sync::Mutex;

use ndarray::ArrayView3;

use crate::inference::domain::face_models::{FaceMeshModel, ModelError};
use crate::inference::infrastructure::{
    backend, bgr_batch, expect_shape, load_session, lock_session,
};
use crate::shared::constants::{MESH_INPUT_SIZE, MESH_LANDMARK_COUNT};

/// Dense face mesh landmark model using ONNX Runtime via `ort`.
pub struct OnnxFaceMesh {
    session: Mutex<ort::session::Session>,
}

impl OnnxFaceMesh {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        log::info!("Loaded mesh model {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl FaceMeshModel for OnnxFaceMesh {
    fn landmarks(&self, crop: ArrayView3<'_, f32>) -> Result<Vec<[f32; 3]>, ModelError> {
        expect_shape(
            "mesh input",
            crop.dim(),
            (MESH_INPUT_SIZE, MESH_INPUT_SIZE, 3),
        )?;

        let input_value = ort::value::Tensor::from_array(bgr_batch(crop)).map_err(backend)?;
        let mut session = lock_session(&self.session)?;
        let outputs = session.run(ort::inputs![input_value]).map_err(backend)?;
        if outputs.len() == 0 {
            return Err(ModelError::OutputCount {
                model: "FaceMesh",
                expected: 1,
                actual: 0,
            });
        }

        let points = outputs[0].try_extract_array::<f32>().map_err(backend)?;
        let data = points
            .as_slice()
            .ok_or_else(|| ModelError::UnexpectedShape("mesh output is not contiguous".into()))?;
        interleaved_points(data)
    }
}

/// Interleaved `x, y, z` triples to points; extra trailing values are ignored.
fn interleaved_points(data: &[f32]) -> Result<Vec<[f32; 3]>, ModelError> {
    if data.len() < MESH_LANDMARK_COUNT * 3 {
        return Err(ModelError::UnexpectedShape(format!(
            "mesh output has {} values, expected {}",
            data.len(),
            MESH_LANDMARK_COUNT * 3
        )));
    }
    Ok(data
        .chunks_exact(3)
        .take(MESH_LANDMARK_COUNT)
        .map(|p| [p[0], p[1], p[2]])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_points() {
        let data: Vec<f32> = (0..MESH_LANDMARK_COUNT * 3).map(|v| v as f32).collect();
        let points = interleaved_points(&data).unwrap();
        assert_eq!(points.len(), MESH_LANDMARK_COUNT);
        assert_eq!(points[1], [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_short_output_is_rejected() {
        let data = vec![0.0; 30];
        assert!(matches!(
            interleaved_points(&data),
            Err(ModelError::UnexpectedShape(_))
        ));
    }
}
