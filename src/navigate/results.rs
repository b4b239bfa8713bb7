//! Result types for navigate operations

use serde::Serialize;

/// A folder inside a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    pub name: String,
}

/// A file inside a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

/// Immediate children of a directory, in filesystem enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub path: String,
    pub directories: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    pub file_count: usize,
    pub folder_count: usize,
    pub total_size_bytes: u64,
}
