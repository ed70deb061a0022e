//! Tracing, logging and the notification sink (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Two-channel (info / error) sink for operator-facing notifications.
pub mod sink;

pub use sink::{Channel, NotificationSink, RecordingSink, SinkLine, TracingSink};
