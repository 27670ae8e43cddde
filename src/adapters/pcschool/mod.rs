//! PCSchool adapter
//!
//! HTTP Basic session plus an HMAC signature on every payload.

pub mod client;
pub mod signing;

pub use client::{lookup_event, normalise_lookup, LookupEntry, PcSchoolClient};
