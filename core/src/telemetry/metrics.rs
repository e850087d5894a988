use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Point-in-time view of the session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Raw lines pulled from the transport, valid or not.
    pub lines_read: usize,
    /// Lines discarded by the parser.
    pub lines_skipped: usize,
    /// Valid readings folded into the aggregator.
    pub readings_recorded: usize,
}

/// Session counters shared between the ingest worker and its handle.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_line(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.lines_read += 1;
        }
    }

    pub fn record_skip(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.lines_skipped += 1;
        }
    }

    pub fn record_reading(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.readings_recorded += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
