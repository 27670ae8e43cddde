//! Sync command implementation
//!
//! This module implements the `sync` command: authenticate against one
//! vendor, fetch the requested collections and hand them to the sink.

use crate::adapters::create_vendor;
use crate::config::{load_config, SatchelConfig};
use crate::core::sync::{SyncCoordinator, SyncSummary};
use crate::domain::{SatchelError, VendorKind};
use crate::sink::create_sink;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Vendor to sync from
    #[arg(short, long)]
    pub vendor: VendorKind,

    /// Collection to sync; repeat for several, omit for all
    #[arg(long)]
    pub collection: Vec<String>,

    /// Fetch and count records without writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(vendor = %self.vendor, "Starting sync command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.run(&config, shutdown_signal).await
    }

    /// Run against an already loaded configuration
    pub async fn run(
        &self,
        config: &SatchelConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let unknown: Vec<&String> = self
            .collection
            .iter()
            .filter(|c| !self.vendor.supports(c))
            .collect();
        if !unknown.is_empty() {
            eprintln!(
                "Unknown collection(s) for {}: {:?}. Available: {}",
                self.vendor,
                unknown,
                self.vendor.collections().join(", ")
            );
            return Ok(2);
        }

        if self.dry_run {
            println!("🔍 DRY RUN MODE - records will not be written");
            println!();
        }

        let vendor = match create_vendor(self.vendor, config).await {
            Ok(v) => v,
            Err(SatchelError::Configuration(message)) => {
                tracing::error!(error = %message, "Vendor is not configured");
                eprintln!("Configuration error: {message}");
                return Ok(2);
            }
            Err(e) => {
                tracing::error!(vendor = %self.vendor, error = %e, "Failed to initialize vendor client");
                eprintln!("Failed to connect to {}: {e}", self.vendor);
                return Ok(5);
            }
        };

        let sink = create_sink(config, self.dry_run);
        let coordinator = SyncCoordinator::new(vendor, sink, shutdown_signal);

        println!("🚀 Syncing from {}...", self.vendor);
        let summary = coordinator.execute_sync(&self.collection).await;
        summary.log_summary();
        print_summary(&summary);

        Ok(if summary.is_successful() { 0 } else { 1 })
    }
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("📊 Sync Summary ({}):", summary.vendor);
    for report in &summary.collections {
        println!(
            "  {}: {} fetched, {} stored, {} skipped ({:.2}s)",
            report.collection,
            report.fetched,
            report.stored,
            report.skipped,
            report.duration.as_secs_f64()
        );
    }
    for error in &summary.errors {
        println!("  {}: FAILED - {}", error.collection, error.message);
    }
    if summary.interrupted {
        println!("  ⚠️  Interrupted before all collections were synced");
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const SENTRAL_ONLY: &str = r#"
[sentral]
base_url = "https://school.sentral.example"
api_key = "key"
tenant_id = "tenant"
"#;

    fn args(vendor: VendorKind, collection: &[&str]) -> SyncArgs {
        SyncArgs {
            vendor,
            collection: collection.iter().map(|c| c.to_string()).collect(),
            dry_run: true,
        }
    }

    #[tokio::test]
    async fn test_unknown_collection_is_configuration_error() {
        let config = parse_config(SENTRAL_ONLY).unwrap();
        let (_tx, rx) = watch::channel(false);
        let code = args(VendorKind::Sentral, &["carers"])
            .run(&config, rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_unconfigured_vendor_is_configuration_error() {
        let config = parse_config(SENTRAL_ONLY).unwrap();
        let (_tx, rx) = watch::channel(false);
        let code = args(VendorKind::Edumate, &[]).run(&config, rx).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let (_tx, rx) = watch::channel(false);
        let code = args(VendorKind::Sentral, &[])
            .execute("/nonexistent/satchel.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
