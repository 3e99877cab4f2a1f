use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayView3, ArrayViewMut2, ArrayViewMut3};

use crate::inference::domain::face_models::{FaceSwapModel, ModelError};
use crate::inference::infrastructure::{
    backend, bgr_batch, expect_shape, load_session, lock_session,
};
use crate::shared::constants::SWAP_PATCH_SIZE;

/// Face-swap generator using ONNX Runtime via `ort`.
///
/// Models with three outputs (`out_face_mask`, `out_celeb_face`,
/// `out_celeb_face_mask`) use the celeb face and its mask; two-output models
/// are read as (face, mask).
pub struct OnnxFaceSwap {
    session: Mutex<ort::session::Session>,
}

impl OnnxFaceSwap {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        log::info!("Loaded face-swap model {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl FaceSwapModel for OnnxFaceSwap {
    fn swap(
        &self,
        source: ArrayView3<'_, f32>,
        generated: ArrayViewMut3<'_, f32>,
        mask: ArrayViewMut2<'_, f32>,
    ) -> Result<(), ModelError> {
        let patch = (SWAP_PATCH_SIZE, SWAP_PATCH_SIZE, 3);
        expect_shape("swap input", source.dim(), patch)?;
        expect_shape("generated face buffer", generated.dim(), patch)?;

        let input_value = ort::value::Tensor::from_array(bgr_batch(source)).map_err(backend)?;
        let mut session = lock_session(&self.session)?;
        let outputs = session.run(ort::inputs![input_value]).map_err(backend)?;

        let (face_idx, mask_idx) = output_indices(outputs.len())?;
        let face = outputs[face_idx].try_extract_array::<f32>().map_err(backend)?;
        let face = face
            .as_slice()
            .ok_or_else(|| ModelError::UnexpectedShape("face output is not contiguous".into()))?;
        let alpha = outputs[mask_idx].try_extract_array::<f32>().map_err(backend)?;
        let alpha = alpha
            .as_slice()
            .ok_or_else(|| ModelError::UnexpectedShape("mask output is not contiguous".into()))?;

        copy_bgr_face(face, generated)?;
        copy_mask(alpha, mask)
    }
}

// ---------------------------------------------------------------------------
// Output copying
// ---------------------------------------------------------------------------

fn output_indices(count: usize) -> Result<(usize, usize), ModelError> {
    match count {
        0 | 1 => Err(ModelError::OutputCount {
            model: "FaceSwap",
            expected: 2,
            actual: count,
        }),
        2 => Ok((0, 1)),
        _ => Ok((1, 2)),
    }
}

fn copy_bgr_face(data: &[f32], mut out: ArrayViewMut3<'_, f32>) -> Result<(), ModelError> {
    let (h, w, _) = out.dim();
    if data.len() != h * w * 3 {
        return Err(ModelError::UnexpectedShape(format!(
            "face output has {} values, expected {}",
            data.len(),
            h * w * 3
        )));
    }
    for ((y, x, c), v) in out.indexed_iter_mut() {
        *v = data[(y * w + x) * 3 + (2 - c)];
    }
    Ok(())
}

fn copy_mask(data: &[f32], mut out: ArrayViewMut2<'_, f32>) -> Result<(), ModelError> {
    let (h, w) = out.dim();
    if data.len() != h * w {
        return Err(ModelError::UnexpectedShape(format!(
            "mask output has {} values, expected {}",
            data.len(),
            h * w
        )));
    }
    for ((y, x), v) in out.indexed_iter_mut() {
        *v = data[y * w + x];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use rstest::rstest;

    #[rstest]
    #[case(2, (0, 1))]
    #[case(3, (1, 2))]
    fn test_output_indices(#[case] count: usize, #[case] expected: (usize, usize)) {
        assert_eq!(output_indices(count).unwrap(), expected);
    }

    #[test]
    fn test_single_output_is_rejected() {
        assert!(matches!(
            output_indices(1),
            Err(ModelError::OutputCount { actual: 1, .. })
        ));
    }

    #[test]
    fn test_copy_bgr_face_restores_rgb() {
        let mut out = Array3::<f32>::zeros((2, 2, 3));
        let mut data = vec![0.0; 12];
        // pixel (1, 0): B = 0.1, G = 0.2, R = 0.3
        data[6..9].copy_from_slice(&[0.1, 0.2, 0.3]);
        copy_bgr_face(&data, out.view_mut()).unwrap();
        assert_eq!(out[[1, 0, 0]], 0.3);
        assert_eq!(out[[1, 0, 2]], 0.1);
    }

    #[test]
    fn test_copy_mask_checks_length() {
        let mut out = Array2::<f32>::zeros((2, 2));
        assert!(copy_mask(&[1.0; 3], out.view_mut()).is_err());
        copy_mask(&[0.0, 0.25, 0.5, 1.0], out.view_mut()).unwrap();
        assert_eq!(out[[1, 0]], 0.5);
    }
}
