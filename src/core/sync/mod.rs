//! Collection sync orchestration

pub mod coordinator;
pub mod summary;

pub use coordinator::SyncCoordinator;
pub use summary::{CollectionReport, SyncError, SyncErrorType, SyncSummary};
