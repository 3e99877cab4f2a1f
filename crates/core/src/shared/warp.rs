use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use crate::shared::affine_transform::AffineTransform;
use crate::shared::frame::Frame;

/// How samples outside the source image are filled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Border {
    Constant(f32),
    Replicate,
}

/// Bilinear sample at `(x, y)` of a `width × height` grid read through `fetch`.
pub fn bilinear<F>(fetch: F, width: usize, height: usize, x: f64, y: f64, border: Border) -> f32
where
    F: Fn(usize, usize) -> f32,
{
    if width == 0 || height == 0 {
        return match border {
            Border::Constant(v) => v,
            Border::Replicate => 0.0,
        };
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let at = |xi: i64, yi: i64| -> f32 {
        match border {
            Border::Constant(v) => {
                if xi < 0 || yi < 0 || xi >= width as i64 || yi >= height as i64 {
                    v
                } else {
                    fetch(xi as usize, yi as usize)
                }
            }
            Border::Replicate => {
                let cx = xi.clamp(0, width as i64 - 1) as usize;
                let cy = yi.clamp(0, height as i64 - 1) as usize;
                fetch(cx, cy)
            }
        }
    };

    let v00 = at(x0, y0);
    let v10 = at(x0 + 1, y0);
    let v01 = at(x0, y0 + 1);
    let v11 = at(x0 + 1, y0 + 1);

    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}

/// Fills `out` (HWC, 3 channels) by sampling the frame's RGB channels at
/// `to_frame(x, y)` for every output pixel. Pixels that land outside the
/// frame become zero. Values are multiplied by `value_scale`.
pub fn warp_frame_into(
    frame: &Frame,
    to_frame: &AffineTransform,
    value_scale: f32,
    mut out: ArrayViewMut3<'_, f32>,
) {
    let src = frame.as_ndarray();
    let (fh, fw) = (frame.height() as usize, frame.width() as usize);
    let (oh, ow, oc) = out.dim();

    for y in 0..oh {
        for x in 0..ow {
            let (sx, sy) = to_frame.apply(x as f64, y as f64);
            for c in 0..oc.min(3) {
                let v = bilinear(
                    |px, py| src[[py, px, c]] as f32,
                    fw,
                    fh,
                    sx,
                    sy,
                    Border::Constant(0.0),
                );
                out[[y, x, c]] = v * value_scale;
            }
        }
    }
}

/// Warps the frame into a fresh `size × size × 3` patch.
pub fn warp_frame_to_patch(
    frame: &Frame,
    to_frame: &AffineTransform,
    size: usize,
    value_scale: f32,
) -> Array3<f32> {
    let mut patch = Array3::<f32>::zeros((size, size, 3));
    warp_frame_into(frame, to_frame, value_scale, patch.view_mut());
    patch
}

/// Bilinear resize of the frame's RGB channels to `width × height`, values 0–255.
///
/// Uses half-pixel centers with edge replication, so a uniform frame stays
/// uniform at any scale.
pub fn resize_frame(frame: &Frame, width: usize, height: usize) -> Array3<f32> {
    let src = frame.as_ndarray();
    let (fh, fw) = (frame.height() as usize, frame.width() as usize);
    let sx = fw as f64 / width as f64;
    let sy = fh as f64 / height as f64;
    let to_frame = AffineTransform::scale_translate(sx, sy, 0.5 * sx - 0.5, 0.5 * sy - 0.5);

    let mut out = Array3::<f32>::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let (px, py) = to_frame.apply(x as f64, y as f64);
            for c in 0..3 {
                out[[y, x, c]] = bilinear(
                    |ix, iy| src[[iy, ix, c]] as f32,
                    fw,
                    fh,
                    px,
                    py,
                    Border::Replicate,
                );
            }
        }
    }
    out
}

/// Bilinear sample of channel `c` of an HWC float image.
pub fn sample_patch(patch: &ArrayView3<'_, f32>, x: f64, y: f64, c: usize, border: Border) -> f32 {
    let (h, w, _) = patch.dim();
    bilinear(|px, py| patch[[py, px, c]], w, h, x, y, border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient_frame(w: u32, h: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 7, 255]);
            }
        }
        Frame::new(data, w, h, 4, 0)
    }

    #[test]
    fn test_bilinear_midpoint() {
        let grid = [0.0f32, 10.0, 20.0, 30.0]; // 2x2
        let v = bilinear(|x, y| grid[y * 2 + x], 2, 2, 0.5, 0.5, Border::Replicate);
        assert_relative_eq!(v, 15.0);
    }

    #[test]
    fn test_bilinear_constant_border_outside() {
        let v = bilinear(|_, _| 5.0, 2, 2, -3.0, -3.0, Border::Constant(1.0));
        assert_relative_eq!(v, 1.0);
    }

    #[test]
    fn test_bilinear_constant_border_blends_at_edge() {
        // Half a pixel beyond the right edge: half source, half border.
        let v = bilinear(|_, _| 4.0, 2, 2, 1.5, 0.0, Border::Constant(0.0));
        assert_relative_eq!(v, 2.0);
    }

    #[test]
    fn test_identity_warp_copies_rgb() {
        let frame = gradient_frame(8, 6);
        let patch = warp_frame_to_patch(&frame, &AffineTransform::identity(), 4, 1.0);
        assert_relative_eq!(patch[[2, 3, 0]], 30.0);
        assert_relative_eq!(patch[[2, 3, 1]], 20.0);
        assert_relative_eq!(patch[[2, 3, 2]], 7.0);
    }

    #[test]
    fn test_warp_applies_value_scale_and_zero_border() {
        let frame = gradient_frame(4, 4);
        let shift = AffineTransform::scale_translate(1.0, 1.0, 100.0, 0.0);
        let patch = warp_frame_to_patch(&frame, &shift, 2, 1.0 / 255.0);
        assert!(patch.iter().all(|&v| v == 0.0));

        let patch = warp_frame_to_patch(&frame, &AffineTransform::identity(), 2, 0.5);
        assert_relative_eq!(patch[[0, 1, 0]], 5.0);
    }

    #[test]
    fn test_resize_uniform_frame_stays_uniform() {
        let frame = Frame::new(vec![90u8; 10 * 10 * 3], 10, 10, 3, 0);
        let out = resize_frame(&frame, 64, 48);
        assert_eq!(out.dim(), (48, 64, 3));
        assert!(out.iter().all(|&v| (v - 90.0).abs() < 1e-4));
    }

    #[test]
    fn test_resize_downscale_by_two_averages() {
        // 2x1 frame [0, 100] downscaled to 1x1 samples the midpoint.
        let frame = Frame::new(vec![0, 0, 0, 100, 100, 100], 2, 1, 3, 0);
        let out = resize_frame(&frame, 1, 1);
        assert_relative_eq!(out[[0, 0, 0]], 50.0);
    }
}
