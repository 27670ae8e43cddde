//! Domain types for Satchel.
//!
//! The domain layer is deliberately thin: SIS records stay vendor-shaped
//! JSON, so what lives here is the shared vocabulary around them.
//!
//! - [`VendorKind`] names each integration and the collections it exposes
//! - [`SatchelError`] / [`VendorError`] and the [`Result`] alias
//! - [`is_email_valid`], the address sanity check used when triaging contacts
//! - [`fields`], lenient serde adapters for flags and ids
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`]:
//!
//! ```rust
//! use satchel::domain::{Result, SatchelError};
//!
//! fn example() -> Result<()> {
//!     let config = satchel::config::load_config("satchel.toml")?;
//!     println!("{}", config.application.log_level);
//!     Ok(())
//! }
//! # let _ = example;
//! ```

pub mod email;
pub mod errors;
pub mod fields;
pub mod result;
pub mod vendor;

pub use email::is_email_valid;
pub use errors::{SatchelError, VendorError};
pub use result::Result;
pub use vendor::VendorKind;
