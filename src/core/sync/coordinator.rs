//! Sync coordinator - drives one vendor's collections into a sink
//!
//! Collections are synced one at a time. A failed collection is recorded in
//! the summary and the run moves on; a shutdown signal stops the run between
//! collections.

use crate::adapters::SisVendor;
use crate::core::sync::summary::{CollectionReport, SyncError, SyncSummary};
use crate::domain::Result;
use crate::sink::RecordSink;
use crate::{log_sync_complete, log_sync_start};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

pub struct SyncCoordinator {
    vendor: Box<dyn SisVendor>,
    sink: Arc<dyn RecordSink>,
    shutdown_signal: watch::Receiver<bool>,
}

impl SyncCoordinator {
    /// `vendor` must already be authenticated, see
    /// [`create_vendor`](crate::adapters::create_vendor)
    pub fn new(
        vendor: Box<dyn SisVendor>,
        sink: Arc<dyn RecordSink>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            vendor,
            sink,
            shutdown_signal,
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    /// Sync `collections`, or every collection of the vendor when empty
    pub async fn execute_sync(&self, collections: &[String]) -> SyncSummary {
        let start_time = Instant::now();
        let kind = self.vendor.kind();
        let mut summary = SyncSummary::new(kind);

        let requested: Vec<String> = if collections.is_empty() {
            kind.collections().iter().map(|c| c.to_string()).collect()
        } else {
            collections.to_vec()
        };

        tracing::info!(
            vendor = %kind,
            sink = self.sink.name(),
            collections = ?requested,
            "Starting sync run"
        );

        for collection in &requested {
            if self.shutdown_requested() {
                tracing::warn!(
                    vendor = %kind,
                    next_collection = %collection,
                    "Shutdown requested, stopping before next collection"
                );
                summary.interrupted = true;
                break;
            }

            match self.sync_collection(collection).await {
                Ok(report) => summary.add_report(report),
                Err(e) => {
                    tracing::error!(
                        vendor = %kind,
                        collection = %collection,
                        error = %e,
                        "Failed to sync collection"
                    );
                    summary.add_error(SyncError::new(collection.as_str(), &e));
                }
            }
        }

        summary.with_duration(start_time.elapsed())
    }

    async fn sync_collection(&self, collection: &str) -> Result<CollectionReport> {
        let kind = self.vendor.kind();
        let start_time = Instant::now();
        log_sync_start!(kind, collection);

        let outcome = self.vendor.fetch(collection).await?;
        let stored = self
            .sink
            .store(kind, collection, &outcome.records)
            .await?;

        let duration = start_time.elapsed();
        if outcome.skipped > 0 {
            tracing::info!(
                vendor = %kind,
                collection = %collection,
                skipped = outcome.skipped,
                "Records skipped"
            );
        }
        log_sync_complete!(kind, collection, stored, duration);

        Ok(CollectionReport {
            collection: collection.to_string(),
            fetched: outcome.records.len(),
            stored,
            skipped: outcome.skipped,
            duration,
        })
    }
}
