use ndarray::Array2;

/// Precompute a normalized 1D Gaussian kernel for `sigma`.
///
/// The kernel spans `±ceil(3σ)` taps. A non-positive sigma yields the
/// identity kernel `[1.0]`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let sigma = sigma as f64;
    let half = (3.0 * sigma).ceil() as usize;
    let mut kernel_f64: Vec<f64> = (0..=2 * half)
        .map(|i| {
            let x = i as f64 - half as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel_f64.iter().sum();
    for v in &mut kernel_f64 {
        *v /= sum;
    }
    kernel_f64.iter().map(|&v| v as f32).collect()
}

/// Separable Gaussian blur of a single-channel image, treating everything
/// outside the image as zero.
pub fn separable_blur_zero_border(data: &mut Array2<f32>, kernel: &[f32]) {
    let kernel_size = kernel.len();
    let (height, width) = data.dim();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size as isize / 2;
    let mut temp = Array2::<f32>::zeros((height, width));

    // Horizontal pass: data → temp
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = x as isize + k as isize - half;
                if sx >= 0 && (sx as usize) < width {
                    sum += data[[y, sx as usize]] * w;
                }
            }
            temp[[y, x]] = sum;
        }
    }

    // Vertical pass: temp → data
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = y as isize + k as isize - half;
                if sy >= 0 && (sy as usize) < height {
                    sum += temp[[sy as usize, x]] * w;
                }
            }
            data[[y, x]] = sum;
        }
    }
}
