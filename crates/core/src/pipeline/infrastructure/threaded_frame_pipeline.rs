use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::alignment::domain::canonical_landmarks::canonical_template;
use crate::compositing::domain::composite_job::CompositeJobPool;
use crate::compositing::domain::face_compositor::FaceCompositor;
use crate::detection::domain::face_tracker::FaceTracker;
use crate::detection::domain::heatmap_decoder::HeatmapDecoder;
use crate::inference::domain::face_models::ModelSet;
use crate::output::domain::frame_sink::FrameSink;
use crate::output::domain::pipeline_stats::{FrameCounters, PipelineStats};
use crate::output::paced_writer::{PacedWriter, ReadyHandle};
use crate::pipeline::frame_pipeline::FramePipeline;
use crate::pipeline::frame_processor::{FrameProcessor, SharedStages};
use crate::pipeline::stages::StageError;
use crate::shared::constants::{SWAP_PATCH_SIZE, SWAP_TEMPLATE_COVERAGE};
use crate::shared::frame::Frame;
use crate::shared::settings::PipelineSettings;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Fixed pool of worker threads between a bounded input queue and the paced
/// writer.
///
/// Layout: `submit → [input queue] → N workers → output → [output queue] → sink`
///
/// Both queues drop on full; only the workers ever block, on the input pop.
pub struct ThreadedFramePipeline {
    input_tx: Option<Sender<Frame>>,
    writer: Arc<PacedWriter>,
    counters: Arc<FrameCounters>,
    in_flight: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    closed: bool,
}

impl ThreadedFramePipeline {
    /// Opens the sink and starts `settings.workers` workers.
    pub fn new(
        models: ModelSet,
        compositor: Box<dyn FaceCompositor>,
        sink: Box<dyn FrameSink>,
        settings: &PipelineSettings,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        settings.validate()?;

        let counters = Arc::new(FrameCounters::default());
        let writer = Arc::new(PacedWriter::new(
            sink,
            settings.queue_capacity,
            settings.frame_rate,
            counters.clone(),
        ));
        writer.open()?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let shared = SharedStages {
            models: Arc::new(models),
            compositor: Arc::from(compositor),
            jobs: Arc::new(CompositeJobPool::new(SWAP_PATCH_SIZE)),
            template: Arc::new(canonical_template(SWAP_PATCH_SIZE, SWAP_TEMPLATE_COVERAGE)),
            cancelled: cancelled.clone(),
        };

        let (input_tx, input_rx) = crossbeam_channel::bounded::<Frame>(settings.queue_capacity);
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(settings.workers);
        for index in 0..settings.workers {
            let processor = FrameProcessor::new(
                shared.clone(),
                HeatmapDecoder::new(settings.confidence_floor),
                FaceTracker::new(settings.overlap_threshold, settings.smoothing_lerp),
            );
            workers.push(spawn_worker(
                index,
                processor,
                input_rx.clone(),
                writer.clone(),
                in_flight.clone(),
            )?);
        }

        log::info!(
            "Pipeline started: {} workers, queue capacity {}, {} fps",
            settings.workers,
            settings.queue_capacity,
            settings.frame_rate
        );

        Ok(Self {
            input_tx: Some(input_tx),
            writer,
            counters,
            in_flight,
            cancelled,
            workers,
            closed: false,
        })
    }

    /// Frames waiting in the input queue.
    pub fn queued_inputs(&self) -> usize {
        self.input_tx.as_ref().map_or(0, Sender::len)
    }

    /// Frames waiting in the output queue for a ready signal.
    pub fn queued_outputs(&self) -> usize {
        self.writer.queued()
    }
}

impl FramePipeline for ThreadedFramePipeline {
    fn submit(&self, frame: Frame) -> bool {
        self.counters.record_read();
        let Some(input_tx) = &self.input_tx else {
            self.counters.record_input_drop();
            return false;
        };

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        match input_tx.try_send(frame) {
            Ok(()) => true,
            Err(e) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                log::debug!("Input queue full, dropping frame {}", e.into_inner().id());
                self.counters.record_input_drop();
                false
            }
        }
    }

    fn notify_ready(&self) {
        self.writer.flush();
    }

    fn ready_handle(&self) -> ReadyHandle {
        ReadyHandle::new(self.writer.clone())
    }

    fn stats(&self) -> PipelineStats {
        self.writer.stats()
    }

    fn pending(&self) -> usize {
        self.in_flight.load(Ordering::Acquire) + self.writer.queued()
    }

    /// Output only drains on ready signals, so a sink-side trigger such as a
    /// `ReadyTicker` must be running.
    fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(DRAIN_POLL_INTERVAL);
        }
        true
    }

    fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.cancelled.store(true, Ordering::Relaxed);
        self.input_tx.take();

        let mut first_error: Option<Box<dyn std::error::Error>> = None;
        for (index, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() && first_error.is_none() {
                first_error = Some(format!("Worker thread {index} panicked").into());
            }
        }

        if let Err(e) = self.writer.close() {
            if first_error.is_none() {
                first_error = Some(Box::new(e));
            }
        }

        log::info!("Pipeline stopped: {}", self.stats().summary_string());

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ThreadedFramePipeline {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Pipeline shutdown failed: {e}");
        }
    }
}

fn spawn_worker(
    index: usize,
    mut processor: FrameProcessor,
    input_rx: Receiver<Frame>,
    writer: Arc<PacedWriter>,
    in_flight: Arc<AtomicUsize>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("lens-worker-{index}"))
        .spawn(move || {
            for mut frame in input_rx {
                match processor.process(&mut frame) {
                    Ok(_) => {}
                    Err(StageError::Cancelled) => {
                        in_flight.fetch_sub(1, Ordering::AcqRel);
                        break;
                    }
                    Err(e) => log::warn!("Frame {}: {e}, passing through", frame.id()),
                }
                writer.output(frame);
                in_flight.fetch_sub(1, Ordering::AcqRel);
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::compositing::infrastructure::cpu_face_compositor::CpuFaceCompositor;
    use crate::output::infrastructure::ready_ticker::ReadyTicker;
    use crate::output::paced_writer::tests::{SinkLog, StubSink};
    use crate::pipeline::test_support::{face_frame, models, StubDetector};

    const W: u32 = 32;
    const H: u32 = 24;

    fn settings(workers: usize, queue_capacity: usize) -> PipelineSettings {
        PipelineSettings {
            workers,
            queue_capacity,
            ..PipelineSettings::default()
        }
    }

    fn pipeline(
        detector: StubDetector,
        workers: usize,
        capacity: usize,
    ) -> (ThreadedFramePipeline, Arc<Mutex<SinkLog>>) {
        let (sink, log) = StubSink::new(W, H);
        let pipeline = ThreadedFramePipeline::new(
            models(detector),
            Box::new(CpuFaceCompositor::default()),
            Box::new(sink),
            &settings(workers, capacity),
        )
        .unwrap();
        (pipeline, log)
    }

    fn numbered_frame(id: u64) -> Frame {
        let mut frame = face_frame(W, H);
        let data = frame.data_mut();
        data[0] = id as u8;
        Frame::new(frame.into_data(), W, H, 4, id)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out waiting");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn settled(p: &ThreadedFramePipeline, total: u64) -> bool {
        let stats = p.stats();
        stats.dropped_input + stats.dropped_output + p.queued_outputs() as u64 == total
    }

    #[test]
    fn test_submit_rejects_when_input_queue_full() {
        let (detector, gate) = StubDetector::gated();
        let (mut p, _log) = pipeline(detector, 1, 2);

        // The lone worker takes the first frame and blocks on the gate.
        assert!(p.submit(numbered_frame(0)));
        wait_until(|| p.queued_inputs() == 0);

        assert!(p.submit(numbered_frame(1)));
        assert!(p.submit(numbered_frame(2)));
        assert!(!p.submit(numbered_frame(3)));
        assert_eq!(p.queued_inputs(), 2);

        drop(gate);
        p.shutdown().unwrap();
        let stats = p.stats();
        assert_eq!(stats.frames_read, 4);
        assert_eq!(stats.dropped_input, 1);
    }

    #[test]
    fn test_frame_without_face_reaches_sink_unchanged() {
        let (mut p, log) = pipeline(StubDetector::empty(), 2, 4);
        let frame = numbered_frame(7);
        let expected = frame.data().to_vec();

        assert!(p.submit(frame));
        wait_until(|| settled(&p, 1));
        p.notify_ready();

        {
            let log = log.lock().unwrap();
            assert_eq!(log.writes.len(), 1);
            assert_eq!(log.writes[0], expected);
        }
        p.shutdown().unwrap();
        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_unsupported_frame_does_not_stop_the_worker() {
        let (mut p, log) = pipeline(StubDetector::empty(), 1, 4);

        assert!(p.submit(Frame::new(vec![10; 48], 8, 6, 1, 0)));
        wait_until(|| settled(&p, 1));
        assert!(p.submit(numbered_frame(1)));
        wait_until(|| settled(&p, 2));

        p.notify_ready();
        p.notify_ready();

        let stats = p.stats();
        assert_eq!(stats.failed_writes, 1);
        assert_eq!(stats.frames_written, 1);
        assert_eq!(log.lock().unwrap().writes.len(), 1);
        p.shutdown().unwrap();
    }

    #[test]
    fn test_output_capacity_bounds_writes_without_ready_signal() {
        let (mut p, log) = pipeline(StubDetector::empty(), 2, 4);

        for id in 0..5 {
            p.submit(numbered_frame(id));
        }
        wait_until(|| settled(&p, 5));
        assert!(log.lock().unwrap().writes.is_empty());

        for _ in 0..6 {
            p.notify_ready();
        }

        assert_eq!(log.lock().unwrap().writes.len(), 4);
        let stats = p.stats();
        assert_eq!(stats.frames_read, 5);
        assert_eq!(stats.frames_written, 4);
        p.shutdown().unwrap();
    }

    #[test]
    fn test_every_frame_arrives_in_any_order() {
        let (mut p, log) = pipeline(StubDetector::empty(), 3, 4);
        for id in 0..3 {
            assert!(p.submit(numbered_frame(id)));
        }
        wait_until(|| settled(&p, 3));
        for _ in 0..3 {
            p.notify_ready();
        }

        let mut ids: Vec<u8> = log.lock().unwrap().writes.iter().map(|w| w[0]).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
        p.shutdown().unwrap();
    }

    #[test]
    fn test_drain_with_ticker_delivers_everything() {
        let (mut p, log) = pipeline(StubDetector::empty(), 2, 4);
        let mut ticker = ReadyTicker::spawn(Duration::from_millis(2), p.ready_handle());

        for id in 0..3 {
            p.submit(numbered_frame(id));
        }
        assert!(p.drain(Duration::from_secs(5)));
        ticker.stop();

        assert_eq!(log.lock().unwrap().writes.len(), 3);
        assert_eq!(p.pending(), 0);
        p.shutdown().unwrap();
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let (mut p, _log) = pipeline(StubDetector::empty(), 1, 4);
        p.shutdown().unwrap();
        assert!(!p.submit(numbered_frame(0)));
        assert_eq!(p.stats().dropped_input, 1);
    }

    #[test]
    fn test_drop_shuts_down_and_closes_sink() {
        let (p, log) = pipeline(StubDetector::empty(), 2, 4);
        assert!(log.lock().unwrap().opened);
        drop(p);
        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (mut p, log) = pipeline(StubDetector::empty(), 2, 4);
        p.shutdown().unwrap();
        p.shutdown().unwrap();
        assert_eq!(log.lock().unwrap().closed, 1);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let (sink, _log) = StubSink::new(W, H);
        let result = ThreadedFramePipeline::new(
            models(StubDetector::empty()),
            Box::new(CpuFaceCompositor::default()),
            Box::new(sink),
            &settings(0, 4),
        );
        assert!(result.is_err());
    }
}
