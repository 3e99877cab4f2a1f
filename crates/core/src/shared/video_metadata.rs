use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Delay between frames at the native rate, or `None` when the container
    /// does not report one.
    pub fn frame_interval_ms(&self) -> Option<f64> {
        (self.fps > 0.0).then(|| 1000.0 / self.fps)
    }
}
