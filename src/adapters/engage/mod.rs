//! Engage (Projects Horizon) adapter

pub mod bundle;
pub mod client;
pub mod models;

pub use client::EngageClient;
