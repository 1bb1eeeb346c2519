//! Status and progress reporting
//!
//! Workers never talk to a console directly. They get an `Arc<dyn StatusSink>`
//! and push free-text status lines plus one progress tick per identifier.

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::info;

/// Receiver of status lines and progress increments
pub trait StatusSink: Send + Sync {
    /// Report a human-readable status line
    fn report_status(&self, line: &str);

    /// Record that one identifier has been fully processed
    fn advance_progress(&self);
}

/// Sink that writes status lines through `tracing`
#[derive(Debug)]
pub struct TracingSink {
    total: usize,
    completed: AtomicUsize,
}

impl TracingSink {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl StatusSink for TracingSink {
    fn report_status(&self, line: &str) {
        info!("{}", line);
    }

    fn advance_progress(&self) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        info!(completed = done, total = self.total, "Progress");
    }
}

/// Event emitted by [`ChannelSink`]
#[derive(Debug, Clone)]
pub enum StatusEvent {
    Status { at: DateTime<Local>, line: String },
    Progress,
}

/// Sink that forwards events to a single consumer, e.g. the progress view
///
/// The channel closes once every clone of the sink is dropped, which tells
/// the consumer the run is over.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusSink for ChannelSink {
    fn report_status(&self, line: &str) {
        // A closed receiver means nobody is watching any more.
        let _ = self.tx.send(StatusEvent::Status {
            at: Local::now(),
            line: line.to_string(),
        });
    }

    fn advance_progress(&self) {
        let _ = self.tx.send(StatusEvent::Progress);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::StatusSink;
    use std::sync::Mutex;

    /// Sink that keeps everything it receives, for assertions
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        lines: Mutex<Vec<String>>,
        progress: Mutex<usize>,
    }

    impl RecordingSink {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn progress(&self) -> usize {
            *self.progress.lock().unwrap()
        }
    }

    impl StatusSink for RecordingSink {
        fn report_status(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }

        fn advance_progress(&self) {
            *self.progress.lock().unwrap() += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_counts_progress() {
        let sink = TracingSink::new(3);
        sink.advance_progress();
        sink.advance_progress();
        sink.report_status("attempt 1 failed");
        assert_eq!(sink.completed(), 2);
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_events_and_closes() {
        let (sink, mut rx) = ChannelSink::new();
        sink.report_status("Proxy error for proxy: http://10.0.0.1:8080");
        sink.advance_progress();
        drop(sink);

        match rx.recv().await {
            Some(StatusEvent::Status { line, .. }) => assert!(line.starts_with("Proxy error")),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.recv().await, Some(StatusEvent::Progress)));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.report_status("nobody listening");
        sink.advance_progress();
    }
}
