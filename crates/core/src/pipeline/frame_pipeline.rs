use std::time::Duration;

use crate::output::domain::pipeline_stats::PipelineStats;
use crate::output::paced_writer::ReadyHandle;
use crate::shared::frame::Frame;

/// Frame-parallel face-swap engine.
///
/// This is a port (application-layer interface). Infrastructure provides the
/// concrete worker pool.
pub trait FramePipeline: Send + Sync {
    /// Hands a frame to the engine without blocking.
    ///
    /// Returns `false` when the input queue is full or the engine is shut
    /// down; the frame is dropped and counted either way.
    fn submit(&self, frame: Frame) -> bool;

    /// The sink is ready for its next frame.
    fn notify_ready(&self);

    /// A cloneable trigger for [`FramePipeline::notify_ready`] that sink-side
    /// threads can own.
    fn ready_handle(&self) -> ReadyHandle;

    fn stats(&self) -> PipelineStats;

    /// Frames queued for or inside the workers, plus frames awaiting the sink.
    fn pending(&self) -> usize;

    /// Waits until [`FramePipeline::pending`] reaches zero or `timeout`
    /// elapses. Returns whether everything was delivered.
    fn drain(&self, timeout: Duration) -> bool;

    /// Stops the workers, discards queued input and closes the sink.
    fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
