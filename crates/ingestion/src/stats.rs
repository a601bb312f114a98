//! Replay counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Events delivered to the receiver
    pub events_sent: AtomicU64,

    /// Frames delivered to the receiver
    pub frames_sent: AtomicU64,

    /// Session lines skipped as malformed
    pub parse_errors: AtomicU64,

    /// Frames skipped because their image failed to load
    pub image_errors: AtomicU64,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&self, is_frame: bool) {
        self.events_sent.fetch_add(1, Ordering::Relaxed);
        if is_frame {
            self.frames_sent.fetch_add(1, Ordering::Relaxed);
        }
        metrics::counter!("scanner_replay_events_total").increment(1);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("scanner_replay_parse_errors_total").increment(1);
    }

    pub fn record_image_error(&self) {
        self.image_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("scanner_replay_image_errors_total").increment(1);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_sent: self.events_sent.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            image_errors: self.image_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_sent: u64,
    pub frames_sent: u64,
    pub parse_errors: u64,
    pub image_errors: u64,
}
