//! School information system integrations
//!
//! One module per vendor, built on a small shared layer:
//!
//! - [`http`] - reqwest session with retry, status mapping and JSON decoding
//! - [`auth`] - request authentication schemes and the bearer-token exchange
//! - [`pagination`] - `pagination.next` / `links.next` cursor traversal
//! - [`vendor`] - the [`SisVendor`] trait every client implements
//! - [`client`] - [`create_vendor`], the factory used by the CLI
//!
//! Vendors:
//!
//! - [`edumate`] - OAuth client credentials, `pagination.next`
//! - [`engage`] - username/password token, single-page responses joined in memory
//! - [`mssql`] - one configured SQL query over TDS
//! - [`pcschool`] - HTTP Basic plus an HMAC-SHA256 signed payload
//! - [`sentral`] - static key/tenant headers, JSON:API, `links.next`
//! - [`tass`] - RPC over GET with an AES-ECB encrypted parameter token
//!
//! # Example
//!
//! ```rust,no_run
//! use satchel::adapters::{create_vendor, SisVendor};
//! use satchel::config::load_config;
//! use satchel::domain::VendorKind;
//!
//! # async fn example() -> satchel::domain::Result<()> {
//! let config = load_config("satchel.toml")?;
//! let engage = create_vendor(VendorKind::Engage, &config).await?;
//!
//! for collection in engage.kind().collections() {
//!     let outcome = engage.fetch(collection).await?;
//!     println!("{collection}: {} records", outcome.records.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod edumate;
pub mod engage;
pub mod http;
pub mod mssql;
pub mod pagination;
pub mod pcschool;
pub mod sentral;
pub mod tass;
pub mod vendor;

pub use client::create_vendor;
pub use vendor::{FetchOutcome, SisVendor};
