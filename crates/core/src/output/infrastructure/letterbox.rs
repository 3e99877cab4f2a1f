use image::imageops::FilterType;
use image::RgbaImage;

use crate::output::domain::frame_sink::SinkError;
use crate::shared::frame::Frame;

/// Fits `frame` into an `out_w × out_h` RGBA canvas.
///
/// The frame is scaled down (never up) to fit, centered, and the remaining
/// canvas is zero. A frame that already matches is only converted to RGBA.
pub fn letterbox_rgba(frame: &Frame, out_w: u32, out_h: u32) -> Result<Vec<u8>, SinkError> {
    let (w, h) = (frame.width(), frame.height());
    let rgba = to_rgba(frame)?;
    if w == out_w && h == out_h {
        return Ok(rgba.into_raw());
    }

    let scale = 1f64
        .min(out_h as f64 / h as f64)
        .min(out_w as f64 / w as f64);
    let new_w = ((w as f64 * scale).round() as u32).clamp(1, out_w.max(1));
    let new_h = ((h as f64 * scale).round() as u32).clamp(1, out_h.max(1));

    let fitted = if new_w == w && new_h == h {
        rgba
    } else {
        image::imageops::resize(&rgba, new_w, new_h, FilterType::Triangle)
    };

    let mut canvas = RgbaImage::new(out_w, out_h);
    let x = (out_w.saturating_sub(new_w) / 2) as i64;
    let y = (out_h.saturating_sub(new_h) / 2) as i64;
    image::imageops::replace(&mut canvas, &fitted, x, y);
    Ok(canvas.into_raw())
}

fn to_rgba(frame: &Frame) -> Result<RgbaImage, SinkError> {
    let (w, h) = (frame.width(), frame.height());
    let data = match frame.channels() {
        4 => frame.data().to_vec(),
        3 => frame
            .data()
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        n => {
            return Err(SinkError::Backend(format!(
                "cannot convert {n}-channel frame to RGBA"
            )))
        }
    };
    let actual = data.len();
    RgbaImage::from_raw(w, h, data).ok_or(SinkError::FrameSize {
        expected: w as usize * h as usize * 4,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, channels: u8, value: u8) -> Frame {
        Frame::new(vec![value; (w * h * channels as u32) as usize], w, h, channels, 0)
    }

    fn px(buf: &[u8], w: u32, x: u32, y: u32) -> &[u8] {
        let i = ((y * w + x) * 4) as usize;
        &buf[i..i + 4]
    }

    #[test]
    fn test_matching_rgba_is_passed_through() {
        let frame = Frame::new((0..64).collect(), 4, 4, 4, 0);
        let out = letterbox_rgba(&frame, 4, 4).unwrap();
        assert_eq!(out, frame.data());
    }

    #[test]
    fn test_rgb_gains_opaque_alpha() {
        let frame = solid(2, 2, 3, 9);
        let out = letterbox_rgba(&frame, 2, 2).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(px(&out, 2, 1, 1), &[9, 9, 9, 255]);
    }

    #[test]
    fn test_small_frame_is_centered_not_upscaled() {
        let frame = solid(2, 2, 4, 255);
        let out = letterbox_rgba(&frame, 6, 4).unwrap();
        assert_eq!(out.len(), 6 * 4 * 4);
        assert_eq!(px(&out, 6, 0, 0), &[0, 0, 0, 0]);
        assert_eq!(px(&out, 6, 2, 1), &[255, 255, 255, 255]);
        assert_eq!(px(&out, 6, 3, 2), &[255, 255, 255, 255]);
        assert_eq!(px(&out, 6, 4, 2), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_wide_frame_is_scaled_to_fit() {
        let frame = solid(8, 4, 4, 200);
        let out = letterbox_rgba(&frame, 4, 4).unwrap();
        // 4x2 image centered vertically: rows 1 and 2 filled.
        assert_eq!(px(&out, 4, 1, 0), &[0, 0, 0, 0]);
        assert_eq!(px(&out, 4, 1, 1), &[200, 200, 200, 200]);
        assert_eq!(px(&out, 4, 1, 3), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_width_mismatch_alone_triggers_letterbox() {
        let frame = solid(4, 4, 4, 50);
        let out = letterbox_rgba(&frame, 8, 4).unwrap();
        assert_eq!(out.len(), 8 * 4 * 4);
        assert_eq!(px(&out, 8, 0, 0), &[0, 0, 0, 0]);
        assert_eq!(px(&out, 8, 2, 0), &[50, 50, 50, 50]);
    }
}
