//! Error types
//!
//! Defines the error taxonomy shared by every filesystem operation and the
//! startup errors of the HTTP server.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// How far a recursive copy or delete got before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub files: u64,
    pub directories: u64,
    pub bytes: u64,
}

impl Progress {
    /// True once at least one entry has been written or removed.
    pub fn has_effect(&self) -> bool {
        self.files > 0 || self.directories > 0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s), {} folder(s), {} byte(s)",
            self.files, self.directories, self.bytes
        )
    }
}

/// Errors produced by the sandboxed filesystem operations.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Destination already exists: {0}")]
    DestinationExists(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A recursive operation failed after it had already changed the tree.
    /// Nothing is rolled back; callers should verify or clean up.
    #[error("{operation} stopped after {progress}: {source}")]
    PartialFailure {
        operation: &'static str,
        progress: Progress,
        #[source]
        source: io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] io::Error),
}

impl ExplorerError {
    /// Stable name of the error kind, as sent to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ExplorerError::AccessDenied(_) => "AccessDenied",
            ExplorerError::NotFound(_) => "NotFound",
            ExplorerError::InvalidArgument(_) => "InvalidArgument",
            ExplorerError::InvalidQuery(_) => "InvalidQuery",
            ExplorerError::InvalidOperation(_) => "InvalidOperation",
            ExplorerError::DestinationExists(_) => "DestinationExists",
            ExplorerError::PayloadTooLarge(_) => "PayloadTooLarge",
            ExplorerError::PartialFailure { .. } => "PartialFailure",
            ExplorerError::Internal(_) => "InternalError",
        }
    }

    /// Progress reached before a partial failure, if any.
    pub fn progress(&self) -> Option<Progress> {
        match self {
            ExplorerError::PartialFailure { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// Wraps an I/O error from a recursive operation, keeping the progress
    /// only when something was already changed on disk.
    pub fn interrupted(operation: &'static str, progress: Progress, source: io::Error) -> Self {
        if progress.has_effect() {
            ExplorerError::PartialFailure {
                operation,
                progress,
                source,
            }
        } else {
            ExplorerError::Internal(source)
        }
    }
}

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid server root: {0}")]
    Root(#[from] ExplorerError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
