use std::path::PathBuf;
use thiserror::Error;

/// Rejected user input. Nothing in the store changes when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task text cannot be empty")]
    EmptyText,
    #[error("invalid due date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid due time '{0}', use HH:MM")]
    InvalidTime(String),
    #[error("unknown reminder '{0}', expected none|5min|15min|30min|at-time")]
    UnknownReminder(String),
    #[error("unknown filter '{0}', expected all|active|completed|overdue|today|week")]
    UnknownFilter(String),
}

/// Failure reading or writing the task file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task data in {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Why an alert could not be shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The alert channel is not allowed to notify. Not treated as a failure.
    #[error("notification permission denied")]
    PermissionDenied,
    #[error("notification delivery failed: {0}")]
    Failed(String),
}
