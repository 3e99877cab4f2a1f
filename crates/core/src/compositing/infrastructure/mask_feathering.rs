use ndarray::Array2;

use crate::compositing::infrastructure::gaussian::{gaussian_kernel_1d, separable_blur_zero_border};

/// Softens the edges of a swap mask.
///
/// Everything outside the mask is treated as zero. `erode > 0` erodes and
/// `erode < 0` dilates with a 3×3 rectangle for `max(1, |erode| / 2)`
/// iterations. A band of `blur / 2` pixels along every edge is then cleared
/// and the result blurred with sigma `blur * 0.25`.
pub fn erode_and_blur(mask: &Array2<f32>, erode: i32, blur: i32) -> Array2<f32> {
    let mut out = mask.clone();

    if erode != 0 {
        let iterations = (erode.unsigned_abs() / 2).max(1);
        for _ in 0..iterations {
            out = if erode > 0 {
                morph(&out, f32::min)
            } else {
                morph(&out, f32::max)
            };
        }
    }

    let band = (blur.max(0) / 2) as usize;
    clear_border(&mut out, band);

    if blur > 0 {
        let kernel = gaussian_kernel_1d(blur as f32 * 0.25);
        separable_blur_zero_border(&mut out, &kernel);
    }

    out
}

/// One 3×3 rectangle morphology step with a zero boundary.
fn morph(src: &Array2<f32>, pick: fn(f32, f32) -> f32) -> Array2<f32> {
    let (h, w) = src.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        let mut acc = src[[y, x]];
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                let sy = y as isize + dy;
                let sx = x as isize + dx;
                let v = if sy < 0 || sx < 0 || sy >= h as isize || sx >= w as isize {
                    0.0
                } else {
                    src[[sy as usize, sx as usize]]
                };
                acc = pick(acc, v);
            }
        }
        acc
    })
}

fn clear_border(data: &mut Array2<f32>, band: usize) {
    if band == 0 {
        return;
    }
    let (h, w) = data.dim();
    for ((y, x), v) in data.indexed_iter_mut() {
        if y < band || x < band || y + band >= h || x + band >= w {
            *v = 0.0;
        }
    }
}
