//! SIS vendor trait definition
//!
//! Every integration implements [`SisVendor`]. The sync coordinator only
//! sees this trait, so adding a vendor means adding one implementation and
//! one arm in [`create_vendor`](super::client::create_vendor).

use crate::domain::{Result, VendorError, VendorKind};
use async_trait::async_trait;
use serde_json::Value;

/// Records produced by one collection fetch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Records to hand to the sink
    pub records: Vec<Value>,

    /// Records dropped because they were malformed or filtered out
    pub skipped: usize,
}

impl FetchOutcome {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            skipped: 0,
        }
    }

    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Trait for school information system clients
///
/// # Example
///
/// ```no_run
/// use satchel::adapters::{create_vendor, SisVendor};
/// use satchel::config::load_config;
/// use satchel::domain::VendorKind;
///
/// # async fn example() -> satchel::domain::Result<()> {
/// let config = load_config("satchel.toml")?;
/// let vendor = create_vendor(VendorKind::Sentral, &config).await?;
///
/// let houses = vendor.fetch("houses").await?;
/// println!("{} houses", houses.records.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SisVendor: Send + Sync {
    /// Which integration this is
    fn kind(&self) -> VendorKind;

    /// Perform the vendor handshake
    ///
    /// Token-based vendors exchange credentials here; header and signature
    /// based vendors only install their scheme. Must be called before
    /// [`SisVendor::fetch`].
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::AuthenticationFailed`] with the response text
    /// when credentials are rejected.
    async fn authenticate(&mut self) -> Result<()>;

    /// Fetch every record of `collection`, following pagination
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::UnsupportedCollection`] for names outside
    /// [`VendorKind::collections`], and vendor errors for failed requests or
    /// malformed pages.
    async fn fetch(&self, collection: &str) -> Result<FetchOutcome>;

    fn is_authenticated(&self) -> bool;

    /// Base URL (or host) of the vendor system
    fn base_url(&self) -> &str;
}

/// Error for a collection the vendor does not expose
pub fn unsupported(kind: VendorKind, collection: &str) -> crate::domain::SatchelError {
    VendorError::UnsupportedCollection {
        vendor: kind.to_string(),
        collection: collection.to_string(),
    }
    .into()
}

/// Error for a data call made before [`SisVendor::authenticate`]
pub fn not_authenticated(kind: VendorKind) -> crate::domain::SatchelError {
    VendorError::NotAuthenticated {
        vendor: kind.to_string(),
    }
    .into()
}
