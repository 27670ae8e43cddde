// Satchel - School Information System Sync Tool
// Copyright (c) 2025 Satchel Contributors
// Licensed under the MIT License

//! # Satchel - School Information System Sync
//!
//! Satchel pulls people and reference data out of the student information
//! systems Australian schools run (Edumate, Engage, PCSchool, Sentral, TASS
//! and plain SQL Server) and writes it out as JSON lines.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Sync orchestration and reporting
//! - [`adapters`] - One client per vendor, plus the shared HTTP layer
//! - [`sink`] - Where fetched records go
//! - [`domain`] - Errors, vendor identifiers and field helpers
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use satchel::adapters::create_vendor;
//! use satchel::config::load_config;
//! use satchel::domain::VendorKind;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("satchel.toml")?;
//!
//!     // Authenticates before returning
//!     let edumate = create_vendor(VendorKind::Edumate, &config).await?;
//!
//!     let carers = edumate.fetch("carers").await?;
//!     println!("{} carers, {} skipped", carers.records.len(), carers.skipped);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`]. Vendor failures arrive as
//! [`domain::VendorError`] with the vendor name attached, so a rejected
//! login reads `edumate: authentication failed: <response body>`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod sink;
