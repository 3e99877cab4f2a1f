use crate::shared::bounds::BoundingBox;

pub const LEFT_EYE: usize = 0;
pub const RIGHT_EYE: usize = 1;
pub const NOSE: usize = 2;
pub const MOUTH_LEFT: usize = 3;
pub const MOUTH_RIGHT: usize = 4;

/// A single detected face: bounds plus five sparse landmarks in frame pixels.
///
/// Landmark order: left eye, right eye, nose, left and right mouth corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub bounds: BoundingBox,
    pub landmarks: [(f32, f32); 5],
    pub score: f32,
}

impl Detection {
    pub fn landmark(&self, index: usize) -> (f32, f32) {
        self.landmarks[index]
    }
}
