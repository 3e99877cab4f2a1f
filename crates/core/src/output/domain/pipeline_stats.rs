use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated without the writer lock, so `submit` and `output`
/// never wait on a sink write.
#[derive(Debug, Default)]
pub struct FrameCounters {
    read: AtomicU64,
    dropped_input: AtomicU64,
    dropped_output: AtomicU64,
}

impl FrameCounters {
    pub fn record_read(&self) {
        self.read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_input_drop(&self) {
        self.dropped_input.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_output_drop(&self) {
        self.dropped_output.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    pub fn dropped_input(&self) -> u64 {
        self.dropped_input.load(Ordering::Relaxed)
    }

    pub fn dropped_output(&self) -> u64 {
        self.dropped_output.load(Ordering::Relaxed)
    }
}

/// Output cadence and throughput.
///
/// `mean_interval_ms` is an exponentially weighted mean of the time between
/// sink writes, seeded with the nominal frame interval.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineStats {
    pub mean_interval_ms: f64,
    pub frames_read: u64,
    pub frames_written: u64,
    pub failed_writes: u64,
    pub dropped_input: u64,
    pub dropped_output: u64,
}

impl PipelineStats {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            mean_interval_ms: 1000.0 / frame_rate.max(1) as f64,
            frames_read: 0,
            frames_written: 0,
            failed_writes: 0,
            dropped_input: 0,
            dropped_output: 0,
        }
    }

    pub fn record_interval(&mut self, interval_ms: f64) {
        self.mean_interval_ms = 0.9 * self.mean_interval_ms + 0.1 * interval_ms;
    }

    /// Frames per second implied by the mean interval, rounded down.
    pub fn frame_rate(&self) -> u32 {
        if self.mean_interval_ms <= 0.0 {
            return 0;
        }
        (1000.0 / self.mean_interval_ms).floor() as u32
    }

    /// Written frames as a percentage of frames offered to the pipeline.
    pub fn throughput(&self) -> f64 {
        if self.frames_read == 0 {
            return 0.0;
        }
        self.frames_written as f64 / self.frames_read as f64 * 100.0
    }

    /// Copies the lock-free counters into this snapshot.
    pub fn with_counters(mut self, counters: &FrameCounters) -> Self {
        self.frames_read = counters.read();
        self.dropped_input = counters.dropped_input();
        self.dropped_output = counters.dropped_output();
        self
    }

    pub fn summary_string(&self) -> String {
        let mut lines = vec![format!(
            "Pipeline summary ({} read, {} written):",
            self.frames_read, self.frames_written
        )];
        lines.push(format!(
            "  Output rate: {} fps (mean interval {:.1}ms)",
            self.frame_rate(),
            self.mean_interval_ms
        ));
        lines.push(format!("  Throughput: {:.1}%", self.throughput()));
        lines.push(format!(
            "  Dropped: {} at input, {} at output",
            self.dropped_input, self.dropped_output
        ));
        if self.failed_writes > 0 {
            lines.push(format!("  Failed writes: {}", self.failed_writes));
        }
        lines.join("\n")
    }
}
