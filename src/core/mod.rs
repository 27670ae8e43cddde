//! Core orchestration for Satchel.
//!
//! # Modules
//!
//! - [`sync`] - runs a vendor's collections into a record sink and reports
//!
//! # Sync Workflow
//!
//! 1. **Authenticate**: [`create_vendor`](crate::adapters::create_vendor) builds and authenticates the client
//! 2. **Fetch**: each collection is fetched in full, following pagination
//! 3. **Store**: records go to the [`RecordSink`](crate::sink::RecordSink)
//! 4. **Report**: a [`SyncSummary`](sync::SyncSummary) collects counts and failures
//!
//! # Example
//!
//! ```rust,no_run
//! use satchel::adapters::create_vendor;
//! use satchel::config::load_config;
//! use satchel::core::sync::SyncCoordinator;
//! use satchel::domain::VendorKind;
//! use satchel::sink::create_sink;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("satchel.toml")?;
//! let vendor = create_vendor(VendorKind::Sentral, &config).await?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = SyncCoordinator::new(vendor, create_sink(&config, false), shutdown_rx);
//!
//! let summary = coordinator.execute_sync(&[]).await;
//! println!("Stored: {}", summary.total_stored());
//! println!("Failed collections: {}", summary.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod sync;
