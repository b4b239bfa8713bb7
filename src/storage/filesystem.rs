//! File system helpers
//!
//! Small metadata queries shared by the storage, navigate, search and
//! transfer modules.

use std::fs;
use std::path::Path;

use crate::storage::results::EntryKind;

/// Create a directory
pub fn create_directory(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Kind of the entry at `path` without following a final symlink.
/// Symlinks count as files so they are removed or moved as links.
pub fn entry_kind(path: &Path) -> Option<EntryKind> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if metadata.is_dir() {
        Some(EntryKind::Folder)
    } else {
        Some(EntryKind::File)
    }
}

/// Final path segment as a display string.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
