//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;

use crate::error::Progress;

/// Whether an entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    File,
    Folder,
}

/// Result of a delete operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    FileDeleted,
    DirectoryDeleted(Progress),
}

impl DeleteOutcome {
    pub fn kind(&self) -> EntryKind {
        match self {
            DeleteOutcome::FileDeleted => EntryKind::File,
            DeleteOutcome::DirectoryDeleted(_) => EntryKind::Folder,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::FileDeleted => "File deleted.",
            DeleteOutcome::DirectoryDeleted(_) => "Directory deleted.",
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        match self {
            DeleteOutcome::FileDeleted => None,
            DeleteOutcome::DirectoryDeleted(progress) => Some(*progress),
        }
    }
}
