//! Sentral adapter
//!
//! JSON:API over `restapi/v1/enrolments`, authenticated by static headers.

pub mod client;
pub mod models;

pub use client::SentralClient;
pub use models::{campus_name, parse_date, IncludedIndex, IncludedKind};
