//! JSON-lines file sink
//!
//! Each `(vendor, collection)` pair goes to `<directory>/<vendor>_<collection>.jsonl`,
//! one record per line. A sync rewrites the whole file: records are written
//! to a `.tmp` sibling first and renamed into place once complete.

use super::RecordSink;
use crate::domain::{Result, SatchelError, VendorKind};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    directory: PathBuf,
}

impl JsonLinesSink {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Output file for one collection
    pub fn path_for(&self, vendor: VendorKind, collection: &str) -> PathBuf {
        self.directory
            .join(format!("{}_{}.jsonl", vendor.as_str(), collection))
    }

    async fn write_lines(&self, path: &Path, records: &[Value]) -> Result<()> {
        let file = fs::File::create(path).await.map_err(|e| {
            SatchelError::Sink(format!("cannot create {}: {e}", path.display()))
        })?;
        let mut writer = BufWriter::new(file);

        for record in records {
            let mut line = serde_json::to_vec(record)?;
            line.push(b'\n');
            writer.write_all(&line).await?;
        }
        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn store(
        &self,
        vendor: VendorKind,
        collection: &str,
        records: &[Value],
    ) -> Result<usize> {
        fs::create_dir_all(&self.directory).await.map_err(|e| {
            SatchelError::Sink(format!(
                "cannot create output directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let path = self.path_for(vendor, collection);
        let staging = path.with_extension("jsonl.tmp");

        if let Err(e) = self.write_lines(&staging, records).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }
        fs::rename(&staging, &path).await.map_err(|e| {
            SatchelError::Sink(format!("cannot move output into {}: {e}", path.display()))
        })?;

        tracing::debug!(
            vendor = %vendor,
            collection = %collection,
            path = %path.display(),
            count = records.len(),
            "Records written"
        );
        Ok(records.len())
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}
