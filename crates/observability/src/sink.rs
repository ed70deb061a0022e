//! Operator-facing notification output.
//!
//! Handlers report outcomes as plain strings on one of two channels. In
//! production the lines go to `tracing`; tests swap in [`RecordingSink`] and
//! assert on exactly what was said.

use std::sync::{Mutex, PoisonError};

/// Output channel of a notification line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Info,
    Error,
}

/// Plain-string log sink with an informational and an error channel.
pub trait NotificationSink: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, message: &str);
}

/// Forwards notifications to `tracing` under the `vendnet::notifications` target.
#[derive(Debug, Default, Copy, Clone)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "vendnet::notifications", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "vendnet::notifications", "{message}");
    }
}

/// A line captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkLine {
    pub channel: Channel,
    pub message: String,
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<SinkLine>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, oldest first.
    pub fn lines(&self) -> Vec<SinkLine> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Messages captured on one channel, oldest first.
    pub fn messages(&self, channel: Channel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.channel == channel)
            .map(|l| l.message)
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, channel: Channel, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SinkLine {
                channel,
                message: message.to_string(),
            });
    }
}

impl NotificationSink for RecordingSink {
    fn info(&self, message: &str) {
        self.push(Channel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(Channel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_channels_apart() {
        let sink = RecordingSink::new();
        sink.info("Machine 001 is low on stock");
        sink.error("Stock level cannot be negative");
        sink.info("Machine 001 stock is OK");

        assert_eq!(sink.lines().len(), 3);
        assert_eq!(
            sink.messages(Channel::Error),
            vec!["Stock level cannot be negative".to_string()]
        );
        assert_eq!(sink.messages(Channel::Info).len(), 2);

        sink.clear();
        assert!(sink.lines().is_empty());
    }
}
