//! Logging setup and transfer counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber; `RUST_LOG` wins over the configured filter
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Process-wide counters for upload and download activity
#[derive(Debug, Default)]
pub struct TransferMetrics {
    batches_started: AtomicU64,
    batches_failed: AtomicU64,
    files_uploaded: AtomicU64,
    bytes_uploaded: AtomicU64,
    files_downloaded: AtomicU64,
}

impl TransferMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_started(&self) {
        self.batches_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "batches_started", "Metric incremented");
    }

    pub fn batch_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "batches_failed", "Metric incremented");
    }

    pub fn file_uploaded(&self, bytes: u64) {
        self.files_uploaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
        tracing::debug!(counter = "files_uploaded", bytes, "Metric incremented");
    }

    pub fn file_downloaded(&self) {
        self.files_downloaded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "files_downloaded", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_started: self.batches_started.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            files_uploaded: self.files_uploaded.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            files_downloaded: self.files_downloaded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_started: u64,
    pub batches_failed: u64,
    pub files_uploaded: u64,
    pub bytes_uploaded: u64,
    pub files_downloaded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = TransferMetrics::new();
        metrics.batch_started();
        metrics.file_uploaded(10);
        metrics.file_uploaded(32);
        metrics.batch_failed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_started, 1);
        assert_eq!(snapshot.batches_failed, 1);
        assert_eq!(snapshot.files_uploaded, 2);
        assert_eq!(snapshot.bytes_uploaded, 42);
        assert_eq!(snapshot.files_downloaded, 0);
    }
}
