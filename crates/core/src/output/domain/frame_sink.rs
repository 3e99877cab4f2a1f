use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink is not open")]
    NotOpen,
    #[error("frame is {actual} bytes, sink expects {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("sink backend failed: {0}")]
    Backend(String),
}

/// Downstream consumer of finished frames.
///
/// Accepts tightly packed RGBA buffers of exactly `width × height × 4`
/// bytes. Readiness is signalled separately through the pipeline's
/// `notify_ready`.
pub trait FrameSink: Send {
    fn open(&mut self) -> Result<(), SinkError>;

    fn write(&mut self, rgba: &[u8]) -> Result<(), SinkError>;

    /// Must be safe to call more than once.
    fn close(&mut self) -> Result<(), SinkError>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn frame_size(&self) -> usize {
        self.width() as usize * self.height() as usize * 4
    }
}
