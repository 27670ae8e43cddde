//! Record sinks
//!
//! Fetched collections are handed to a [`RecordSink`]. The sync coordinator
//! never knows where records end up; the CLI picks the sink from the
//! configuration and the `--dry-run` flag.

pub mod dry_run;
pub mod jsonl;

pub use dry_run::DryRunSink;
pub use jsonl::JsonLinesSink;

use crate::config::SatchelConfig;
use crate::domain::{Result, VendorKind};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Destination for fetched records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store every record of one collection, replacing earlier output
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns [`SatchelError::Sink`](crate::domain::SatchelError::Sink) or
    /// an I/O error when the records cannot be persisted.
    async fn store(&self, vendor: VendorKind, collection: &str, records: &[Value])
        -> Result<usize>;

    /// Short name used in logs and summaries
    fn name(&self) -> &'static str;
}

/// Create the sink for this run
///
/// `dry_run` wins over the configured output directory.
pub fn create_sink(config: &SatchelConfig, dry_run: bool) -> Arc<dyn RecordSink> {
    if dry_run || config.application.dry_run {
        tracing::info!("Dry run: records will be counted but not written");
        Arc::new(DryRunSink::new())
    } else {
        tracing::info!(directory = %config.output.directory, "Writing records as JSON lines");
        Arc::new(JsonLinesSink::new(&config.output.directory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const CONFIG: &str = r#"
[output]
directory = "/tmp/satchel-test-out"

[sentral]
base_url = "https://school.sentral.example"
api_key = "key"
tenant_id = "tenant"
"#;

    #[test]
    fn test_create_sink_honours_flag() {
        let config = parse_config(CONFIG).unwrap();
        assert_eq!(create_sink(&config, false).name(), "jsonl");
        assert_eq!(create_sink(&config, true).name(), "dry-run");
    }

    #[test]
    fn test_create_sink_honours_application_dry_run() {
        let mut config = parse_config(CONFIG).unwrap();
        config.application.dry_run = true;
        assert_eq!(create_sink(&config, false).name(), "dry-run");
    }
}
