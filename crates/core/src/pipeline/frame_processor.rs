use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::compositing::domain::composite_job::CompositeJobPool;
use crate::compositing::domain::face_compositor::FaceCompositor;
use crate::detection::domain::face_tracker::FaceTracker;
use crate::detection::domain::heatmap_decoder::HeatmapDecoder;
use crate::inference::domain::face_models::ModelSet;
use crate::pipeline::stages::{self, StageError};
use crate::shared::frame::Frame;

/// What happened to a frame that went through the stage chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Swapped,
    NoFace,
}

/// Collaborators shared by every worker.
#[derive(Clone)]
pub struct SharedStages {
    pub models: Arc<ModelSet>,
    pub compositor: Arc<dyn FaceCompositor>,
    pub jobs: Arc<CompositeJobPool>,
    pub template: Arc<Vec<[f64; 2]>>,
    pub cancelled: Arc<AtomicBool>,
}

/// One worker's view of the stage chain.
///
/// Holds the worker's own tracking memory; nothing here is shared between
/// frames of different workers.
pub struct FrameProcessor {
    shared: SharedStages,
    decoder: HeatmapDecoder,
    tracker: FaceTracker,
}

impl FrameProcessor {
    pub fn new(shared: SharedStages, decoder: HeatmapDecoder, tracker: FaceTracker) -> Self {
        Self {
            shared,
            decoder,
            tracker,
        }
    }

    /// Runs detect → track → align → swap → composite on `frame` in place.
    ///
    /// On any error the frame is left untouched and the tracking memory is
    /// cleared, exactly as for a frame without a face.
    pub fn process(&mut self, frame: &mut Frame) -> Result<FrameOutcome, StageError> {
        let result = self.run_stages(frame);
        if !matches!(result, Ok(FrameOutcome::Swapped)) {
            self.tracker.forget();
        }
        result
    }

    pub fn tracker(&self) -> &FaceTracker {
        &self.tracker
    }

    fn run_stages(&mut self, frame: &mut Frame) -> Result<FrameOutcome, StageError> {
        let models = &*self.shared.models;
        if !matches!(frame.channels(), 3 | 4) {
            return Err(StageError::UnsupportedFrame(frame.channels()));
        }

        self.check_cancelled()?;
        let Some(detection) = stages::detect(&*models.detector, &self.decoder, frame)? else {
            return Ok(FrameOutcome::NoFace);
        };
        let detection = self.tracker.smooth(detection);

        self.check_cancelled()?;
        let face = stages::align(&*models.mesh, frame, &detection, &self.shared.template)?;
        self.tracker.remember(face.bounds);

        self.check_cancelled()?;
        let mut job = self.shared.jobs.acquire();
        let job = &mut *job;
        stages::swap(&*models.swap, frame, &face, job)?;
        self.shared
            .compositor
            .composite(frame, job, &face.to_frame)
            .map_err(|e| StageError::Composite(e.to_string()))?;

        Ok(FrameOutcome::Swapped)
    }

    fn check_cancelled(&self) -> Result<(), StageError> {
        if self.shared.cancelled.load(Ordering::Relaxed) {
            return Err(StageError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::canonical_landmarks::canonical_template;
    use crate::compositing::infrastructure::cpu_face_compositor::CpuFaceCompositor;
    use crate::pipeline::test_support::{face_frame, models, StubDetector};
    use crate::shared::constants::{
        DEFAULT_CONFIDENCE_FLOOR, SWAP_PATCH_SIZE, SWAP_TEMPLATE_COVERAGE,
    };

    fn processor(detector: StubDetector) -> (FrameProcessor, SharedStages) {
        let shared = SharedStages {
            models: Arc::new(models(detector)),
            compositor: Arc::new(CpuFaceCompositor::new(0, 0)),
            jobs: Arc::new(CompositeJobPool::new(SWAP_PATCH_SIZE)),
            template: Arc::new(canonical_template(SWAP_PATCH_SIZE, SWAP_TEMPLATE_COVERAGE)),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        let processor = FrameProcessor::new(
            shared.clone(),
            HeatmapDecoder::new(DEFAULT_CONFIDENCE_FLOOR),
            FaceTracker::default(),
        );
        (processor, shared)
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 4] {
        let i = (y * frame.width() as usize + x) * 4;
        let d = frame.data();
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }

    #[test]
    fn test_no_face_leaves_frame_untouched() {
        let (mut p, _) = processor(StubDetector::empty());
        let mut frame = face_frame(320, 240);
        let before = frame.data().to_vec();

        assert_eq!(p.process(&mut frame).unwrap(), FrameOutcome::NoFace);
        assert_eq!(frame.data(), &before[..]);
        assert!(p.tracker().remembered().is_none());
    }

    #[test]
    fn test_face_is_swapped_inside_and_kept_outside() {
        let (mut p, shared) = processor(StubDetector::face());
        let mut frame = face_frame(320, 240);
        let before = face_frame(320, 240);

        assert_eq!(p.process(&mut frame).unwrap(), FrameOutcome::Swapped);

        // A flat generated face under a full mask leaves the face region flat.
        assert_ne!(pixel(&before, 150, 115), pixel(&before, 170, 125));
        assert_eq!(pixel(&frame, 150, 115), pixel(&frame, 170, 125));
        assert_eq!(pixel(&frame, 160, 120)[3], 255);
        assert_eq!(pixel(&frame, 2, 2), pixel(&before, 2, 2));
        assert!(p.tracker().remembered().is_some());
        assert_eq!(shared.jobs.available(), 1);
    }

    #[test]
    fn test_model_error_passes_frame_through_and_forgets() {
        let (mut p, _) = processor(StubDetector::failing());
        let mut frame = face_frame(64, 48);
        let before = frame.data().to_vec();

        assert!(matches!(p.process(&mut frame), Err(StageError::Model(_))));
        assert_eq!(frame.data(), &before[..]);
        assert!(p.tracker().remembered().is_none());
    }

    #[test]
    fn test_single_channel_frame_is_rejected_untouched() {
        let (mut p, _) = processor(StubDetector::face());
        let mut frame = Frame::new(vec![10; 48], 8, 6, 1, 0);

        assert!(matches!(
            p.process(&mut frame),
            Err(StageError::UnsupportedFrame(1))
        ));
        assert_eq!(frame.data(), &[10u8; 48][..]);
        assert!(p.tracker().remembered().is_none());
    }

    #[test]
    fn test_cancelled_processor_does_nothing() {
        let (mut p, shared) = processor(StubDetector::face());
        shared.cancelled.store(true, Ordering::Relaxed);
        let mut frame = face_frame(320, 240);
        let before = frame.data().to_vec();

        assert!(matches!(p.process(&mut frame), Err(StageError::Cancelled)));
        assert_eq!(frame.data(), &before[..]);
    }

    #[test]
    fn test_second_frame_reuses_composite_job() {
        let (mut p, shared) = processor(StubDetector::face());
        for _ in 0..3 {
            let mut frame = face_frame(320, 240);
            p.process(&mut frame).unwrap();
        }
        assert_eq!(shared.jobs.allocated(), 1);
    }
}
