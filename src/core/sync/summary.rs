//! Sync summary and reporting

use crate::domain::{SatchelError, VendorError, VendorKind};
use std::time::Duration;

/// Outcome of one collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionReport {
    pub collection: String,

    /// Records returned by the vendor
    pub fetched: usize,

    /// Records accepted by the sink
    pub stored: usize,

    /// Records the vendor client dropped as malformed or filtered
    pub skipped: usize,

    pub duration: Duration,
}

/// Summary of a sync run against one vendor
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub vendor: VendorKind,

    /// Collections that completed, in run order
    pub collections: Vec<CollectionReport>,

    /// Collections that failed
    pub errors: Vec<SyncError>,

    /// Set when a shutdown signal stopped the run early
    pub interrupted: bool,

    pub duration: Duration,
}

impl SyncSummary {
    pub fn new(vendor: VendorKind) -> Self {
        Self {
            vendor,
            collections: Vec::new(),
            errors: Vec::new(),
            interrupted: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_report(&mut self, report: CollectionReport) {
        self.collections.push(report);
    }

    pub fn add_error(&mut self, error: SyncError) {
        self.errors.push(error);
    }

    pub fn total_fetched(&self) -> usize {
        self.collections.iter().map(|r| r.fetched).sum()
    }

    pub fn total_stored(&self) -> usize {
        self.collections.iter().map(|r| r.stored).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.collections.iter().map(|r| r.skipped).sum()
    }

    /// True when every requested collection completed
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty() && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            vendor = %self.vendor,
            collections = self.collections.len(),
            fetched = self.total_fetched(),
            stored = self.total_stored(),
            skipped = self.total_skipped(),
            failed = self.errors.len(),
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Sync finished"
        );

        for error in &self.errors {
            tracing::warn!(
                vendor = %self.vendor,
                collection = %error.collection,
                error_type = ?error.error_type,
                message = %error.message,
                "Collection failed"
            );
        }
    }
}

/// Broad cause of a failed collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorType {
    /// Credentials rejected or handshake missing
    Authentication,
    /// Transport failure or 5xx after retries
    Connection,
    /// 4xx, unexpected body shape or failed query
    Response,
    /// The sink could not persist the records
    Storage,
    Configuration,
}

impl From<&SatchelError> for SyncErrorType {
    fn from(err: &SatchelError) -> Self {
        match err {
            SatchelError::Vendor(vendor) => match vendor {
                VendorError::AuthenticationFailed { .. } | VendorError::NotAuthenticated { .. } => {
                    Self::Authentication
                }
                VendorError::ConnectionFailed { .. } | VendorError::ServerError { .. } => {
                    Self::Connection
                }
                VendorError::UnsupportedCollection { .. } => Self::Configuration,
                VendorError::ClientError { .. }
                | VendorError::InvalidResponse { .. }
                | VendorError::QueryFailed { .. } => Self::Response,
            },
            SatchelError::Sink(_) | SatchelError::Io(_) => Self::Storage,
            SatchelError::Configuration(_) => Self::Configuration,
            SatchelError::Validation(_) | SatchelError::Serialization(_) => Self::Response,
        }
    }
}

/// A failed collection with its cause
#[derive(Debug, Clone)]
pub struct SyncError {
    pub collection: String,
    pub error_type: SyncErrorType,
    pub message: String,
}

impl SyncError {
    pub fn new(collection: impl Into<String>, err: &SatchelError) -> Self {
        Self {
            collection: collection.into(),
            error_type: SyncErrorType::from(err),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(collection: &str, fetched: usize, skipped: usize) -> CollectionReport {
        CollectionReport {
            collection: collection.to_string(),
            fetched,
            stored: fetched,
            skipped,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_totals() {
        let mut summary = SyncSummary::new(VendorKind::Engage);
        summary.add_report(report("pupils", 10, 1));
        summary.add_report(report("contacts", 4, 3));

        assert_eq!(summary.total_fetched(), 14);
        assert_eq!(summary.total_stored(), 14);
        assert_eq!(summary.total_skipped(), 4);
        assert!(summary.is_successful());
    }

    #[test]
    fn test_error_or_interrupt_is_not_successful() {
        let mut summary = SyncSummary::new(VendorKind::Sentral);
        summary.interrupted = true;
        assert!(!summary.is_successful());

        let mut summary = SyncSummary::new(VendorKind::Sentral);
        summary.add_error(SyncError::new(
            "persons",
            &SatchelError::Sink("disk full".to_string()),
        ));
        assert!(!summary.is_successful());
        assert_eq!(summary.errors[0].error_type, SyncErrorType::Storage);
    }

    #[test]
    fn test_error_classification() {
        let auth = SatchelError::Vendor(VendorError::AuthenticationFailed {
            vendor: "edumate".to_string(),
            message: "invalid_client".to_string(),
        });
        assert_eq!(SyncErrorType::from(&auth), SyncErrorType::Authentication);

        let server = SatchelError::Vendor(VendorError::ServerError {
            vendor: "sentral".to_string(),
            status: 503,
            message: String::new(),
        });
        assert_eq!(SyncErrorType::from(&server), SyncErrorType::Connection);

        let shape = SatchelError::Vendor(VendorError::InvalidResponse {
            vendor: "edumate".to_string(),
            message: "missing 'carers'".to_string(),
        });
        assert_eq!(SyncErrorType::from(&shape), SyncErrorType::Response);
    }
}
