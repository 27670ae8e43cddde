//! Counting sink for `--dry-run`

use super::RecordSink;
use crate::domain::{Result, VendorKind};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Accepts every record and writes nothing
#[derive(Debug, Default)]
pub struct DryRunSink {
    seen: AtomicUsize,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records accepted since creation
    pub fn seen(&self) -> usize {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordSink for DryRunSink {
    async fn store(
        &self,
        vendor: VendorKind,
        collection: &str,
        records: &[Value],
    ) -> Result<usize> {
        self.seen.fetch_add(records.len(), Ordering::Relaxed);
        tracing::debug!(
            vendor = %vendor,
            collection = %collection,
            count = records.len(),
            "Dry run, not writing"
        );
        Ok(records.len())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
