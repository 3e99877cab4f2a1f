use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::output::domain::frame_sink::{FrameSink, SinkError};
use crate::output::domain::pipeline_stats::{FrameCounters, PipelineStats};
use crate::output::infrastructure::letterbox::letterbox_rgba;
use crate::shared::frame::Frame;

/// Sink-paced writer draining the bounded output queue.
///
/// The sink asks for frames through [`PacedWriter::flush`]. A flush that finds
/// the queue empty marks the writer ready, and the next frame handed to
/// [`PacedWriter::output`] is then written inline on the caller's thread.
/// The queue pop, the ready flag, the sink and the cadence stats share one
/// lock, so inline and external flushes never overlap.
pub struct PacedWriter {
    queue_tx: Sender<Frame>,
    queue_rx: Receiver<Frame>,
    state: Mutex<WriterState>,
    counters: Arc<FrameCounters>,
}

struct WriterState {
    sink: Box<dyn FrameSink>,
    ready: bool,
    stats: PipelineStats,
    last_write: Option<Instant>,
}

impl PacedWriter {
    pub fn new(
        sink: Box<dyn FrameSink>,
        capacity: usize,
        frame_rate: u32,
        counters: Arc<FrameCounters>,
    ) -> Self {
        let (queue_tx, queue_rx) = crossbeam_channel::bounded(capacity);
        Self {
            queue_tx,
            queue_rx,
            state: Mutex::new(WriterState {
                sink,
                ready: false,
                stats: PipelineStats::new(frame_rate),
                last_write: None,
            }),
            counters,
        }
    }

    pub fn open(&self) -> Result<(), SinkError> {
        self.lock().sink.open()
    }

    /// Queues a finished frame without blocking. A full queue drops the frame.
    ///
    /// Returns whether the frame was queued.
    pub fn output(&self, frame: Frame) -> bool {
        match self.queue_tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) | Err(TrySendError::Disconnected(frame)) => {
                log::debug!("Output queue full, dropping frame {}", frame.id());
                self.counters.record_output_drop();
                return false;
            }
        }

        let mut state = self.lock();
        if state.ready {
            self.flush_locked(&mut state);
        }
        true
    }

    /// Writes one queued frame to the sink, or arms the inline path when the
    /// queue is empty.
    pub fn flush(&self) {
        let mut state = self.lock();
        self.flush_locked(&mut state);
    }

    pub fn close(&self) -> Result<(), SinkError> {
        self.lock().sink.close()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    pub fn queued(&self) -> usize {
        self.queue_rx.len()
    }

    pub fn stats(&self) -> PipelineStats {
        self.lock().stats.clone().with_counters(&self.counters)
    }

    fn flush_locked(&self, state: &mut WriterState) {
        let Ok(frame) = self.queue_rx.try_recv() else {
            state.ready = true;
            return;
        };
        state.ready = false;

        let (sink_w, sink_h) = (state.sink.width(), state.sink.height());
        let written = match letterbox_rgba(&frame, sink_w, sink_h) {
            Ok(rgba) => state.sink.write(&rgba),
            Err(e) => Err(e),
        };
        drop(frame);

        if let Err(e) = written {
            log::warn!("Sink write failed: {e}");
            state.stats.failed_writes += 1;
            return;
        }

        let now = Instant::now();
        if let Some(last) = state.last_write.replace(now) {
            state
                .stats
                .record_interval(now.duration_since(last).as_secs_f64() * 1000.0);
        }
        state.stats.frames_written += 1;

        let read = self.counters.read();
        let throughput = if read == 0 {
            0.0
        } else {
            state.stats.frames_written as f64 / read as f64 * 100.0
        };
        log::debug!(
            "frame_rate={} | throughput={throughput:.0}%",
            state.stats.frame_rate()
        );
    }

    fn lock(&self) -> MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable trigger for the sink side: each call asks the writer for one
/// frame.
#[derive(Clone)]
pub struct ReadyHandle {
    writer: Arc<PacedWriter>,
}

impl ReadyHandle {
    pub fn new(writer: Arc<PacedWriter>) -> Self {
        Self { writer }
    }

    pub fn notify_ready(&self) {
        self.writer.flush();
    }
}
