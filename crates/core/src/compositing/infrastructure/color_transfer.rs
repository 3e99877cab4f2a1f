//! Mean/std color transfer in CIE L*a*b*.

use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis};

/// D65 reference white.
const WHITE_X: f32 = 0.950456;
const WHITE_Z: f32 = 1.088754;

const STD_EPSILON: f32 = 1e-6;

/// Shifts and scales each L*a*b* channel of `image` so its mean and standard
/// deviation match `like`, clipping to the valid Lab ranges. Both images are
/// RGB in 0..1; `image` is rewritten in place.
pub fn transfer_color(mut image: ArrayViewMut3<'_, f32>, like: ArrayView3<'_, f32>) {
    let mut lab = to_lab(image.view());
    let like_lab = to_lab(like);

    let src_stats = channel_stats(&lab);
    let like_stats = channel_stats(&like_lab);

    for c in 0..3 {
        let (src_mean, src_std) = src_stats[c];
        let (like_mean, like_std) = like_stats[c];
        let ratio = if src_std > STD_EPSILON {
            like_std / src_std
        } else {
            1.0
        };
        let (lo, hi) = if c == 0 { (0.0, 100.0) } else { (-127.0, 127.0) };
        lab.index_axis_mut(Axis(2), c)
            .mapv_inplace(|v| ((v - src_mean) * ratio + like_mean).clamp(lo, hi));
    }

    let (h, w, _) = lab.dim();
    for y in 0..h {
        for x in 0..w {
            let rgb = lab_to_rgb(lab[[y, x, 0]], lab[[y, x, 1]], lab[[y, x, 2]]);
            for (c, v) in rgb.into_iter().enumerate() {
                image[[y, x, c]] = v;
            }
        }
    }
}

fn to_lab(image: ArrayView3<'_, f32>) -> Array3<f32> {
    let (h, w, _) = image.dim();
    let mut lab = Array3::<f32>::zeros((h, w, 3));
    for y in 0..h {
        for x in 0..w {
            let [l, a, b] = rgb_to_lab(image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]]);
            lab[[y, x, 0]] = l;
            lab[[y, x, 1]] = a;
            lab[[y, x, 2]] = b;
        }
    }
    lab
}

/// Per-channel (mean, population std).
fn channel_stats(lab: &Array3<f32>) -> [(f32, f32); 3] {
    let mut stats = [(0.0, 0.0); 3];
    for (c, stat) in stats.iter_mut().enumerate() {
        let channel = lab.index_axis(Axis(2), c);
        let n = channel.len().max(1) as f64;
        let mean = channel.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = channel
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        *stat = (mean as f32, var.sqrt() as f32);
    }
    stats
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let t = f * f * f;
    if t > 0.008856 {
        t
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

pub fn rgb_to_lab(r: f32, g: f32, b: f32) -> [f32; 3] {
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / WHITE_X;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
    let z = (0.019334 * r + 0.119193 * g + 0.950227 * b) / WHITE_Z;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > 0.008856 {
        116.0 * fy - 16.0
    } else {
        903.3 * y
    };
    [l, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

pub fn lab_to_rgb(l: f32, a: f32, b: f32) -> [f32; 3] {
    let fy = (l + 16.0) / 116.0;
    let y = if l > 903.3 * 0.008856 {
        fy * fy * fy
    } else {
        l / 903.3
    };
    let x = lab_f_inv(fy + a / 500.0) * WHITE_X;
    let z = lab_f_inv(fy - b / 200.0) * WHITE_Z;

    let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
    let g = -0.969256 * x + 1.875992 * y + 0.041556 * z;
    let b = 0.055648 * x - 0.204043 * y + 1.057311 * z;
    [
        linear_to_srgb(r.max(0.0)).clamp(0.0, 1.0),
        linear_to_srgb(g.max(0.0)).clamp(0.0, 1.0),
        linear_to_srgb(b.max(0.0)).clamp(0.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_white_and_black() {
        let [l, a, b] = rgb_to_lab(1.0, 1.0, 1.0);
        assert_relative_eq!(l, 100.0, epsilon = 0.01);
        assert_relative_eq!(a, 0.0, epsilon = 0.01);
        assert_relative_eq!(b, 0.0, epsilon = 0.01);
        assert_relative_eq!(rgb_to_lab(0.0, 0.0, 0.0)[0], 0.0, epsilon = 1e-4);
    }

    #[rstest]
    #[case(0.5, 0.5, 0.5)]
    #[case(0.9, 0.2, 0.1)]
    #[case(0.05, 0.6, 0.8)]
    #[case(0.01, 0.01, 0.02)]
    fn test_lab_round_trip(#[case] r: f32, #[case] g: f32, #[case] b: f32) {
        let [l, a, bb] = rgb_to_lab(r, g, b);
        let rgb = lab_to_rgb(l, a, bb);
        assert_relative_eq!(rgb[0], r, epsilon = 1e-3);
        assert_relative_eq!(rgb[1], g, epsilon = 1e-3);
        assert_relative_eq!(rgb[2], b, epsilon = 1e-3);
    }

    fn patch(f: impl Fn(usize, usize, usize) -> f32) -> Array3<f32> {
        Array3::from_shape_fn((8, 8, 3), |(y, x, c)| f(y, x, c))
    }

    #[test]
    fn test_transfer_matches_target_statistics() {
        let mut image = patch(|y, x, c| 0.2 + 0.05 * ((x + y + c) % 5) as f32);
        let like = patch(|y, x, c| 0.4 + 0.03 * ((2 * x + y + c) % 7) as f32);

        transfer_color(image.view_mut(), like.view());

        let got = channel_stats(&to_lab(image.view()));
        let want = channel_stats(&to_lab(like.view()));
        for c in 0..3 {
            assert_relative_eq!(got[c].0, want[c].0, epsilon = 0.5);
            assert_relative_eq!(got[c].1, want[c].1, epsilon = 0.5);
        }
    }

    #[test]
    fn test_transfer_onto_itself_is_identity() {
        let original = patch(|y, x, c| 0.3 + 0.04 * ((x * 3 + y + c) % 6) as f32);
        let mut image = original.clone();
        transfer_color(image.view_mut(), original.view());
        for (a, b) in image.iter().zip(original.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 2e-3);
        }
    }

    #[test]
    fn test_flat_image_is_shifted_not_scaled() {
        let mut image = Array3::<f32>::from_elem((4, 4, 3), 0.5);
        let like = Array3::<f32>::from_elem((4, 4, 3), 0.5);
        transfer_color(image.view_mut(), like.view());
        assert!(image.iter().all(|v| v.is_finite()));
        assert_relative_eq!(image[[0, 0, 0]], 0.5, epsilon = 2e-3);
    }
}
