//! Transfer result types
//!
//! Defines result structures returned by move, copy and upload operations.

use serde::Serialize;

use crate::error::Progress;
use crate::storage::EntryKind;

/// Result of a move or copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub kind: EntryKind,
    /// Final path relative to the root.
    pub destination: String,
    pub progress: Progress,
}

/// Result of a completed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Stored file path relative to the root.
    pub path: String,
    pub size: u64,
}
