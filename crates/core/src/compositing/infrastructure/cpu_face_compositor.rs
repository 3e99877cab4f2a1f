use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use crate::compositing::domain::composite_job::CompositeJob;
use crate::compositing::domain::face_compositor::FaceCompositor;
use crate::compositing::infrastructure::color_transfer::transfer_color;
use crate::compositing::infrastructure::mask_feathering::erode_and_blur;
use crate::shared::affine_transform::AffineTransform;
use crate::shared::constants::{DEFAULT_FEATHER_BLUR, DEFAULT_FEATHER_ERODE};
use crate::shared::frame::Frame;
use crate::shared::warp::{bilinear, sample_patch, Border};

/// CPU compositor: feathered mask, Lab color matching, frame-space blend.
pub struct CpuFaceCompositor {
    erode: i32,
    blur: i32,
}

impl CpuFaceCompositor {
    pub fn new(erode: i32, blur: i32) -> Self {
        Self { erode, blur }
    }
}

impl Default for CpuFaceCompositor {
    fn default() -> Self {
        Self::new(DEFAULT_FEATHER_ERODE, DEFAULT_FEATHER_BLUR)
    }
}

impl FaceCompositor for CpuFaceCompositor {
    fn composite(
        &self,
        frame: &mut Frame,
        job: &mut CompositeJob,
        to_frame: &AffineTransform,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() < 3 {
            return Err(format!("cannot composite into {}-channel frame", frame.channels()).into());
        }
        if !to_frame.is_finite() {
            return Err("face transform is not finite".into());
        }
        let to_canonical = to_frame.inverse();
        if !to_canonical.is_finite() {
            return Err("face transform is not invertible".into());
        }

        job.mask = erode_and_blur(&job.mask, self.erode, self.blur);
        transfer_color(job.generated.view_mut(), job.source.view());
        premultiply(&mut job.generated, &job.mask);

        blend(
            frame,
            job.generated.view(),
            job.mask.view(),
            to_frame,
            &to_canonical,
        );
        Ok(())
    }
}

/// `face * 255 * mask`, in place.
fn premultiply(face: &mut Array3<f32>, mask: &Array2<f32>) {
    for ((y, x, _), v) in face.indexed_iter_mut() {
        *v *= 255.0 * mask[[y, x]];
    }
}

/// `dst = dst * (1 - mask) + premultiplied_face`, sampled through
/// `to_canonical` for every frame pixel the patch can reach.
fn blend(
    frame: &mut Frame,
    face: ArrayView3<'_, f32>,
    mask: ArrayView2<'_, f32>,
    to_frame: &AffineTransform,
    to_canonical: &AffineTransform,
) {
    let (fw, fh) = (frame.width() as usize, frame.height() as usize);
    let (mh, mw) = mask.dim();
    let Some((x0, y0, x1, y1)) = footprint(to_frame, mw, mh, fw, fh) else {
        return;
    };
    let channels = frame.channels() as usize;
    let data = frame.data_mut();

    for y in y0..y1 {
        for x in x0..x1 {
            let (u, v) = to_canonical.apply(x as f64, y as f64);
            let coverage = bilinear(|px, py| mask[[py, px]], mw, mh, u, v, Border::Constant(0.0));
            if coverage <= 0.0 {
                continue;
            }
            let keep = 1.0 - coverage;
            let idx = (y * fw + x) * channels;
            for c in 0..3 {
                let add = sample_patch(&face, u, v, c, Border::Constant(0.0));
                let blended = data[idx + c] as f32 * keep + add;
                data[idx + c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Frame-space rectangle `[x0, x1) × [y0, y1)` covering the warped patch.
fn footprint(
    to_frame: &AffineTransform,
    patch_w: usize,
    patch_h: usize,
    frame_w: usize,
    frame_h: usize,
) -> Option<(usize, usize, usize, usize)> {
    let (pw, ph) = (patch_w as f64, patch_h as f64);
    let corners = [(0.0, 0.0), (pw, 0.0), (0.0, ph), (pw, ph)].map(|(u, v)| to_frame.apply(u, v));

    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let x0 = (min_x.floor() - 1.0).clamp(0.0, frame_w as f64) as usize;
    let y0 = (min_y.floor() - 1.0).clamp(0.0, frame_h as f64) as usize;
    let x1 = (max_x.ceil() + 1.0).clamp(0.0, frame_w as f64) as usize;
    let y1 = (max_y.ceil() + 1.0).clamp(0.0, frame_h as f64) as usize;

    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}
