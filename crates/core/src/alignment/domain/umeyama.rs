use nalgebra::{Matrix2, Vector2};

use crate::shared::affine_transform::AffineTransform;

/// Singular values at or below this count as zero when computing rank.
const RANK_TOLERANCE: f64 = 1e-8;

/// Least-squares similarity transform (rotation, uniform scale, translation)
/// mapping `src` onto `dst`.
///
/// Shinji Umeyama, "Least-squares estimation of transformation parameters
/// between two point patterns", PAMI 1991, DOI: 10.1109/34.88573.
///
/// Returns the NaN sentinel (see [`AffineTransform::nan`]) when fewer than two
/// point pairs are given, the sets differ in length, or the cross-covariance
/// has rank zero.
pub fn estimate_similarity(src: &[[f64; 2]], dst: &[[f64; 2]]) -> AffineTransform {
    let n = src.len();
    if n < 2 || n != dst.len() {
        return AffineTransform::nan();
    }

    let src_mean = mean(src);
    let dst_mean = mean(dst);

    // Eq. (38): cross-covariance of the demeaned sets, plus source variance.
    let mut covariance = Matrix2::<f64>::zeros();
    let mut src_variance = 0.0;
    for (s, d) in src.iter().zip(dst) {
        let s = Vector2::new(s[0], s[1]) - src_mean;
        let d = Vector2::new(d[0], d[1]) - dst_mean;
        covariance += d * s.transpose();
        src_variance += s.norm_squared();
    }
    covariance /= n as f64;
    src_variance /= n as f64;

    let svd = covariance.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return AffineTransform::nan();
    };
    let singular = svd.singular_values;

    let rank = singular.iter().filter(|&&s| s > RANK_TOLERANCE).count();
    if rank == 0 || !src_variance.is_normal() {
        return AffineTransform::nan();
    }

    // Eq. (39): flip the weakest axis when the covariance is a reflection.
    let weakest = if singular[0] <= singular[1] { 0 } else { 1 };
    let mut d = Vector2::new(1.0, 1.0);
    if covariance.determinant() < 0.0 {
        d[weakest] = -1.0;
    }

    // Eq. (40) and (43).
    let rotation = if rank == 1 {
        if u.determinant() * v_t.determinant() > 0.0 {
            u * v_t
        } else {
            let mut flipped = d;
            flipped[weakest] = -1.0;
            u * Matrix2::from_diagonal(&flipped) * v_t
        }
    } else {
        u * Matrix2::from_diagonal(&d) * v_t
    };

    // Eq. (41) and (42).
    let scale = singular.dot(&d) / src_variance;
    let linear = rotation * scale;
    let translation = dst_mean - linear * src_mean;

    AffineTransform::from_rows(
        [linear[(0, 0)], linear[(0, 1)], translation.x],
        [linear[(1, 0)], linear[(1, 1)], translation.y],
    )
}

fn mean(points: &[[f64; 2]]) -> Vector2<f64> {
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + Vector2::new(p[0], p[1]));
    sum / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn similarity(scale: f64, angle: f64, tx: f64, ty: f64) -> AffineTransform {
        let (s, c) = angle.sin_cos();
        AffineTransform::from_rows([scale * c, -scale * s, tx], [scale * s, scale * c, ty])
    }

    fn apply_all(t: &AffineTransform, pts: &[[f64; 2]]) -> Vec<[f64; 2]> {
        pts.iter()
            .map(|p| {
                let (x, y) = t.apply(p[0], p[1]);
                [x, y]
            })
            .collect()
    }

    fn face_like_points() -> Vec<[f64; 2]> {
        vec![
            [30.0, 40.0],
            [70.0, 41.0],
            [50.0, 60.0],
            [35.0, 80.0],
            [66.0, 79.0],
            [51.0, 95.0],
        ]
    }

    #[rstest]
    #[case::identity(1.0, 0.0, 0.0, 0.0)]
    #[case::translate(1.0, 0.0, 12.5, -3.0)]
    #[case::scale_rotate(1.7, 0.52, 4.0, 9.0)]
    #[case::shrink_upside_down(0.25, 3.0, -100.0, 50.0)]
    fn test_round_trip_recovers_target(
        #[case] scale: f64,
        #[case] angle: f64,
        #[case] tx: f64,
        #[case] ty: f64,
    ) {
        let src = face_like_points();
        let dst = apply_all(&similarity(scale, angle, tx, ty), &src);

        let estimated = estimate_similarity(&src, &dst);
        assert!(estimated.is_finite());
        for (got, want) in apply_all(&estimated, &src).iter().zip(&dst) {
            assert_relative_eq!(got[0], want[0], epsilon = 1e-8);
            assert_relative_eq!(got[1], want[1], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_two_points_are_enough() {
        let src = [[0.0, 0.0], [10.0, 0.0]];
        let dst = [[5.0, 5.0], [5.0, 25.0]];
        let t = estimate_similarity(&src, &dst);
        let (x, y) = t.apply(10.0, 0.0);
        assert_relative_eq!(x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(y, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_points_round_trip() {
        let src: Vec<[f64; 2]> = (0..5).map(|i| [i as f64, 2.0 * i as f64]).collect();
        let dst = apply_all(&similarity(2.0, 0.3, 1.0, 1.0), &src);
        let estimated = estimate_similarity(&src, &dst);
        for (got, want) in apply_all(&estimated, &src).iter().zip(&dst) {
            assert_relative_eq!(got[0], want[0], epsilon = 1e-8);
            assert_relative_eq!(got[1], want[1], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_mirrored_target_yields_rotation_not_reflection() {
        let src = face_like_points();
        let dst: Vec<[f64; 2]> = src.iter().map(|p| [-p[0], p[1]]).collect();
        let t = estimate_similarity(&src, &dst);
        assert!(t.is_finite());
        let m = t.matrix();
        let det = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)];
        assert!(det > 0.0, "expected a proper rotation, det = {det}");
    }

    #[test]
    fn test_identical_source_points_return_nan() {
        let src = [[3.0, 3.0]; 4];
        let dst = face_like_points()[..4].to_vec();
        assert!(!estimate_similarity(&src, &dst).is_finite());
    }

    #[test]
    fn test_identical_target_points_return_nan() {
        let src = face_like_points();
        let dst = vec![[1.0, 1.0]; src.len()];
        let t = estimate_similarity(&src, &dst);
        assert!(t.matrix().iter().all(|v| v.is_nan()));
    }

    #[rstest]
    #[case::empty(vec![], vec![])]
    #[case::single(vec![[1.0, 2.0]], vec![[3.0, 4.0]])]
    #[case::mismatched(vec![[0.0, 0.0], [1.0, 1.0]], vec![[0.0, 0.0]])]
    fn test_too_few_points_return_nan(#[case] src: Vec<[f64; 2]>, #[case] dst: Vec<[f64; 2]>) {
        assert!(!estimate_similarity(&src, &dst).is_finite());
    }
}
