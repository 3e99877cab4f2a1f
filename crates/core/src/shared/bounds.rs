/// Axis-aligned face bounds in frame pixels.
///
/// Edges are floating point so that sub-pixel smoothing survives between
/// frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box of size `width × height` centered on `(cx, cy)`, clamped to
    /// `[0, frame_w] × [0, frame_h]`.
    pub fn from_center_clamped(
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
        frame_w: f32,
        frame_h: f32,
    ) -> Self {
        Self {
            left: (cx - width * 0.5).max(0.0),
            top: (cy - height * 0.5).max(0.0),
            right: (cx + width * 0.5).min(frame_w),
            bottom: (cy + height * 0.5).min(frame_h),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) as f64 * self.height().max(0.0) as f64
    }

    /// Intersection area divided by *this* box's area.
    ///
    /// Unlike IoU this is asymmetric: a box fully contained in `other`
    /// scores 1.0 regardless of how large `other` is.
    pub fn overlap_ratio(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.left.max(other.left);
        let iy1 = self.top.max(other.top);
        let ix2 = self.right.min(other.right);
        let iy2 = self.bottom.min(other.bottom);

        if ix2 <= ix1 || iy2 <= iy1 {
            return 0.0;
        }

        let own = self.area();
        if own == 0.0 {
            return 0.0;
        }
        (ix2 - ix1) as f64 * (iy2 - iy1) as f64 / own
    }

    /// Linear blend toward `other`: `self * (1 - t) + other * t` on origin and size.
    pub fn lerp(&self, other: &BoundingBox, t: f64) -> BoundingBox {
        let mix = |a: f32, b: f32| (a as f64 * (1.0 - t) + b as f64 * t) as f32;
        let left = mix(self.left, other.left);
        let top = mix(self.top, other.top);
        let width = mix(self.width(), other.width());
        let height = mix(self.height(), other.height());
        BoundingBox {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }
}
