use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome counters kept by the collector.
///
/// Only the collector task mutates these; the pipeline reads them once the
/// collector has drained the channel and returned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkStats {
    pub received: usize,
    pub saved: usize,
    pub save_failures: usize,
    pub indexed: usize,
    pub index_failures: usize,
}

/// Summary of one completed ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub files_discovered: usize,
    pub extraction_failures: usize,
    pub sinks: SinkStats,
}

impl IngestReport {
    /// Records that reached the collector.
    pub fn extracted(&self) -> usize {
        self.sinks.received
    }

    pub fn saved(&self) -> usize {
        self.sinks.saved
    }

    pub fn indexed(&self) -> usize {
        self.sinks.indexed
    }

    pub fn log_summary(&self) {
        log::info!(
            "ingestion finished in {:.2}s: {} files, {} extracted ({} failed), \
             {} saved ({} failed), {} indexed ({} failed)",
            self.elapsed.as_secs_f64(),
            self.files_discovered,
            self.sinks.received,
            self.extraction_failures,
            self.sinks.saved,
            self.sinks.save_failures,
            self.sinks.indexed,
            self.sinks.index_failures,
        );
    }
}
