//! Error types for host collaborators.
//!
//! The engine itself never fails: per the degrade-gracefully policy, every
//! collaborator error is absorbed into an empty substitution or a false
//! condition at the call site. [`DataError`] exists so data-source and
//! field implementations have a typed seam to report through.

use thiserror::Error;

use crate::context::{RecordId, UserId};

/// Errors a data source or field implementation can report.
#[derive(Debug, Error)]
pub enum DataError {
    /// The record does not exist (deleted, or never committed).
    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    /// The user does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The field exists but has no stored content for this record.
    #[error("no content for field '{field}' in record {record}")]
    NoContent { field: String, record: RecordId },

    /// Any storage-backend failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, DataError>;
