use crate::detection::domain::detection::Detection;
use crate::inference::domain::face_models::{DetectorOutput, ModelError};
use crate::shared::bounds::BoundingBox;
use crate::shared::constants::{DETECTOR_INPUT_HEIGHT, DETECTOR_INPUT_WIDTH, DETECTOR_STRIDE};

/// Turns raw detector grids into at most one [`Detection`].
///
/// Only the single strongest heatmap cell is considered, and only when its
/// score is strictly above the confidence floor.
pub struct HeatmapDecoder {
    confidence_floor: f32,
}

impl HeatmapDecoder {
    pub fn new(confidence_floor: f32) -> Self {
        Self { confidence_floor }
    }

    pub fn decode(
        &self,
        output: &DetectorOutput,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Option<Detection>, ModelError> {
        validate(output)?;

        let Some((cy, cx, score)) = self.strongest_cell(output) else {
            return Ok(None);
        };

        let fw = frame_width as f32;
        let fh = frame_height as f32;
        let gx = DETECTOR_STRIDE * fw / DETECTOR_INPUT_WIDTH as f32;
        let gy = DETECTOR_STRIDE * fh / DETECTOR_INPUT_HEIGHT as f32;

        let center_x = ((cx as f32 + 0.5 + output.offset[[1, cy, cx]]) * gx).clamp(0.0, fw);
        let center_y = ((cy as f32 + 0.5 + output.offset[[0, cy, cx]]) * gy).clamp(0.0, fh);
        let scale_x = output.scale[[1, cy, cx]].exp() * gx;
        let scale_y = output.scale[[0, cy, cx]].exp() * gy;

        let bounds =
            BoundingBox::from_center_clamped(center_x, center_y, scale_x, scale_y, fw, fh);

        let mut landmarks = [(0.0, 0.0); 5];
        for (i, point) in landmarks.iter_mut().enumerate() {
            let raw_y = output.landmarks[[2 * i, cy, cx]];
            let raw_x = output.landmarks[[2 * i + 1, cy, cx]];
            *point = (
                center_x + (raw_x - 0.5) * scale_x,
                center_y + (raw_y - 0.5) * scale_y,
            );
        }

        Ok(Some(Detection {
            bounds,
            landmarks,
            score,
        }))
    }

    fn strongest_cell(&self, output: &DetectorOutput) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, usize, f32)> = None;
        for ((y, x), &score) in output.heatmap.indexed_iter() {
            if score <= self.confidence_floor {
                continue;
            }
            if best.map_or(true, |(_, _, b)| score > b) {
                best = Some((y, x, score));
            }
        }
        best
    }
}

fn validate(output: &DetectorOutput) -> Result<(), ModelError> {
    let (h, w) = output.heatmap.dim();
    let check = |name: &str, channels: usize, dim: (usize, usize, usize)| {
        if dim != (channels, h, w) {
            return Err(ModelError::UnexpectedShape(format!(
                "{name} grid is {dim:?}, expected ({channels}, {h}, {w})"
            )));
        }
        Ok(())
    };
    check("scale", 2, output.scale.dim())?;
    check("offset", 2, output.offset.dim())?;
    check("landmark", 10, output.landmarks.dim())?;
    Ok(())
}
