use nalgebra::{Matrix3, Vector3};

/// 2-D affine transform stored as a 3×3 homogeneous matrix in `f64`.
///
/// A transform whose entries are all NaN is the "unusable" sentinel returned
/// by degenerate estimations; check [`AffineTransform::is_finite`] before
/// applying one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix3<f64>,
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn nan() -> Self {
        Self {
            matrix: Matrix3::from_element(f64::NAN),
        }
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// Builds the transform from the top two rows `[a b tx; c d ty]`.
    pub fn from_rows(row0: [f64; 3], row1: [f64; 3]) -> Self {
        Self {
            matrix: Matrix3::new(
                row0[0], row0[1], row0[2], row1[0], row1[1], row1[2], 0.0, 0.0, 1.0,
            ),
        }
    }

    /// `p' = (p * scale) + offset`, per axis.
    pub fn scale_translate(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self::from_rows([sx, 0.0, tx], [0.0, sy, ty])
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let p = self.matrix * Vector3::new(x, y, 1.0);
        (p.x, p.y)
    }

    /// Inverse transform, or the NaN sentinel when the matrix is singular.
    pub fn inverse(&self) -> Self {
        self.matrix
            .try_inverse()
            .map(Self::from_matrix)
            .unwrap_or_else(Self::nan)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_apply() {
        let (x, y) = AffineTransform::identity().apply(3.0, -4.0);
        assert_relative_eq!(x, 3.0);
        assert_relative_eq!(y, -4.0);
    }

    #[test]
    fn test_scale_translate_apply() {
        let t = AffineTransform::scale_translate(2.0, 3.0, 10.0, 20.0);
        let (x, y) = t.apply(1.0, 1.0);
        assert_relative_eq!(x, 12.0);
        assert_relative_eq!(y, 23.0);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = AffineTransform::from_rows([0.8, -0.6, 5.0], [0.6, 0.8, -7.0]);
        let (x, y) = t.apply(11.0, 13.0);
        let (bx, by) = t.inverse().apply(x, y);
        assert_relative_eq!(bx, 11.0, epsilon = 1e-9);
        assert_relative_eq!(by, 13.0, epsilon = 1e-9);
    }

    #[test]
    fn test_singular_inverse_is_nan() {
        let t = AffineTransform::from_rows([0.0, 0.0, 1.0], [0.0, 0.0, 1.0]);
        assert!(!t.inverse().is_finite());
    }

    #[test]
    fn test_nan_is_not_finite() {
        assert!(!AffineTransform::nan().is_finite());
        assert!(AffineTransform::identity().is_finite());
    }
}
