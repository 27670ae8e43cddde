//! Edumate adapter
//!
//! Carers, LMS students, staff and past students from the Edumate REST API.

pub mod academic;
pub mod carers;
pub mod client;
pub mod models;

pub use academic::academic_year;
pub use carers::CarerFilter;
pub use client::EdumateClient;
