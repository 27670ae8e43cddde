//! Logging and observability
//!
//! Structured logging via `tracing`, with an optional rotating JSON file
//! layer, plus a handful of macros that keep sync events uniform across
//! vendors.
//!
//! # Example
//!
//! ```no_run
//! use satchel::logging::init_logging;
//! use satchel::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(vendor = "sentral", "Sync started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a collection sync
///
/// # Example
///
/// ```no_run
/// use satchel::log_sync_start;
///
/// log_sync_start!("edumate", "carers");
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($vendor:expr, $collection:expr) => {
        tracing::info!(
            vendor = %$vendor,
            collection = %$collection,
            "Starting sync"
        );
    };
}

/// Log the completion of a collection sync
///
/// # Example
///
/// ```no_run
/// use satchel::log_sync_complete;
/// use std::time::Duration;
///
/// log_sync_complete!("sentral", "persons", 42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_sync_complete {
    ($vendor:expr, $collection:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            vendor = %$vendor,
            collection = %$collection,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Sync completed"
        );
    };
}

/// Log a record that was dropped during filtering or decoding
///
/// # Example
///
/// ```no_run
/// use satchel::log_record_skipped;
///
/// log_record_skipped!("engage", "contacts", "C-17", "no email addresses");
/// ```
#[macro_export]
macro_rules! log_record_skipped {
    ($vendor:expr, $collection:expr, $record_id:expr, $reason:expr) => {
        tracing::warn!(
            vendor = %$vendor,
            collection = %$collection,
            record_id = %$record_id,
            reason = %$reason,
            "Skipping record"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use satchel::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
