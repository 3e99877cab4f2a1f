pub mod onnx_center_face;
pub mod onnx_face_mesh;
pub mod onnx_face_swap;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use ndarray::{Array4, ArrayView3};

use crate::inference::domain::face_models::ModelError;

pub(crate) fn backend(e: impl std::fmt::Display) -> ModelError {
    ModelError::Backend(e.to_string())
}

pub(crate) fn load_session(
    model_path: &Path,
) -> Result<ort::session::Session, Box<dyn std::error::Error>> {
    let intra_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let session = ort::session::Session::builder()?
        .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
        .with_inter_threads(1)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(model_path)?;
    Ok(session)
}

pub(crate) fn lock_session(
    session: &Mutex<ort::session::Session>,
) -> Result<MutexGuard<'_, ort::session::Session>, ModelError> {
    session
        .lock()
        .map_err(|e| ModelError::Backend(format!("Lock poisoned: {e}")))
}

/// HWC RGB image to a `[1, H, W, 3]` BGR batch, values unchanged.
pub(crate) fn bgr_batch(image: ArrayView3<'_, f32>) -> Array4<f32> {
    let (h, w, _) = image.dim();
    Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| image[[y, x, 2 - c]])
}

pub(crate) fn expect_shape(
    what: &str,
    actual: (usize, usize, usize),
    expected: (usize, usize, usize),
) -> Result<(), ModelError> {
    if actual != expected {
        return Err(ModelError::UnexpectedShape(format!(
            "{what} is {actual:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_bgr_batch_swaps_channels() {
        let mut image = Array3::<f32>::zeros((2, 3, 3));
        image[[1, 2, 0]] = 10.0;
        image[[1, 2, 2]] = 30.0;
        let batch = bgr_batch(image.view());
        assert_eq!(batch.dim(), (1, 2, 3, 3));
        assert_eq!(batch[[0, 1, 2, 0]], 30.0);
        assert_eq!(batch[[0, 1, 2, 2]], 10.0);
    }

    #[test]
    fn test_expect_shape_reports_mismatch() {
        assert!(expect_shape("crop", (192, 192, 3), (192, 192, 3)).is_ok());
        let err = expect_shape("crop", (1, 2, 3), (192, 192, 3)).unwrap_err();
        assert!(err.to_string().contains("crop"));
    }
}
