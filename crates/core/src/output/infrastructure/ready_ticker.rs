use std::thread::JoinHandle;
use std::time::Duration;

use crate::output::paced_writer::ReadyHandle;

/// Signals sink readiness at a fixed interval, for sinks that have no
/// readiness callback of their own (files).
pub struct ReadyTicker {
    stop_tx: Option<crossbeam_channel::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReadyTicker {
    pub fn spawn(interval: Duration, ready: ReadyHandle) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let handle = std::thread::spawn(move || {
            let ticks = crossbeam_channel::tick(interval);
            loop {
                crossbeam_channel::select! {
                    recv(ticks) -> _ => ready.notify_ready(),
                    recv(stop_rx) -> _ => break,
                }
            }
        });
        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Ready ticker thread panicked");
            }
        }
    }
}

impl Drop for ReadyTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    use crate::output::domain::pipeline_stats::FrameCounters;
    use crate::output::paced_writer::tests::StubSink;
    use crate::output::paced_writer::PacedWriter;
    use crate::shared::frame::Frame;

    #[test]
    fn test_ticks_drain_queue_until_stopped() {
        let (sink, log) = StubSink::new(1, 1);
        let writer = Arc::new(PacedWriter::new(
            Box::new(sink),
            4,
            30,
            Arc::new(FrameCounters::default()),
        ));
        for id in 0..3 {
            writer.output(Frame::new(vec![0; 4], 1, 1, 4, id));
        }

        let mut ticker =
            ReadyTicker::spawn(Duration::from_millis(2), ReadyHandle::new(writer.clone()));
        let deadline = Instant::now() + Duration::from_secs(5);
        while log.lock().unwrap().writes.len() < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        ticker.stop();

        assert_eq!(log.lock().unwrap().writes.len(), 3);
        assert!(writer.is_ready() || writer.queued() == 0);
    }

    #[test]
    fn test_drop_stops_thread() {
        let (sink, _log) = StubSink::new(1, 1);
        let writer = Arc::new(PacedWriter::new(
            Box::new(sink),
            1,
            30,
            Arc::new(FrameCounters::default()),
        ));
        let ticker = ReadyTicker::spawn(Duration::from_millis(1), ReadyHandle::new(writer));
        drop(ticker);
    }
}
