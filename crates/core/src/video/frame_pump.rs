use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;

/// Totals for one pump run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub frames_decoded: u64,
    pub frames_accepted: u64,
    pub restarts: u64,
}

/// Feeds decoded frames to the engine at a fixed rate, the way a live camera
/// would.
///
/// Frames are renumbered so ids keep increasing across loop restarts.
pub struct FramePump {
    frame_interval: Duration,
    looping: bool,
    max_frames: Option<u64>,
    cancelled: Arc<AtomicBool>,
}

impl FramePump {
    pub fn new(frame_rate: u32, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            frame_interval: Duration::from_secs(1) / frame_rate.max(1),
            looping: false,
            max_frames: None,
            cancelled,
        }
    }

    /// Restart from the first frame at end of file.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Stop after this many decoded frames.
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Pumps frames from an already opened `reader` into `submit` until end
    /// of file (or, when looping, until cancelled or the frame limit).
    ///
    /// `submit` returns whether the frame was accepted.
    pub fn run<F>(
        &self,
        reader: &mut dyn VideoReader,
        path: &Path,
        mut submit: F,
    ) -> Result<PumpReport, Box<dyn std::error::Error>>
    where
        F: FnMut(Frame) -> bool,
    {
        let mut report = PumpReport::default();
        let mut next_due = Instant::now();

        loop {
            let mut yielded = false;
            for result in reader.frames() {
                if self.should_stop(&report) {
                    return Ok(report);
                }
                let decoded = result?;
                yielded = true;

                let now = Instant::now();
                if next_due > now {
                    std::thread::sleep(next_due - now);
                } else {
                    next_due = now;
                }
                next_due += self.frame_interval;

                let (w, h, c) = (decoded.width(), decoded.height(), decoded.channels());
                let frame = Frame::new(decoded.into_data(), w, h, c, report.frames_decoded);
                report.frames_decoded += 1;
                if submit(frame) {
                    report.frames_accepted += 1;
                }
            }

            if !self.looping || !yielded || self.should_stop(&report) {
                break;
            }
            reader.close();
            reader.open(path)?;
            report.restarts += 1;
            log::debug!("Restarting {} from the first frame", path.display());
        }

        Ok(report)
    }

    fn should_stop(&self, report: &PumpReport) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self
                .max_frames
                .map_or(false, |max| report.frames_decoded >= max)
    }
}
