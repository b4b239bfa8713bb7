//! Navigation operations implementation

use log::{error, info, warn};
use std::fs;

use crate::error::ExplorerError;
use crate::navigate::results::{DirectoryListing, FileEntry, FolderEntry};
use crate::storage::filesystem::directory_exists;
use crate::storage::validation::ResolvedPath;
use crate::transfer::is_upload_temp;

/// Lists the immediate children of a directory.
///
/// Folder sizes are not computed; `total_size_bytes` sums files only.
pub fn list_directory(target: &ResolvedPath) -> Result<DirectoryListing, ExplorerError> {
    let real_path = target.as_path();

    if !directory_exists(real_path) {
        return Err(ExplorerError::NotFound(format!(
            "Directory not found: {}",
            target.display_path()
        )));
    }

    let entries = fs::read_dir(real_path).map_err(|e| {
        error!(
            "Failed to list directory {} (real: {}): {}",
            target.display_path(),
            real_path.display(),
            e
        );
        ExplorerError::Internal(e)
    })?;

    let mut directories = Vec::new();
    let mut files = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", real_path.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if is_upload_temp(&name) {
            continue;
        }

        // Follows symlinks so a link to a folder is listed as a folder
        match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_dir() => directories.push(FolderEntry { name }),
            Ok(metadata) => files.push(FileEntry {
                name,
                size: metadata.len(),
            }),
            Err(e) => warn!("Skipping {} in {}: {}", name, real_path.display(), e),
        }
    }

    let total_size_bytes = files.iter().map(|f| f.size).sum();

    info!(
        "Listed directory {} (real: {}) - {} folders, {} files",
        target.display_path(),
        real_path.display(),
        directories.len(),
        files.len()
    );

    Ok(DirectoryListing {
        path: target.display_path().to_string(),
        file_count: files.len(),
        folder_count: directories.len(),
        total_size_bytes,
        directories,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SandboxRoot;
    use tempfile::TempDir;

    #[test]
    fn test_list_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("photos/2024")).unwrap();
        fs::create_dir_all(temp_dir.path().join("music")).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "Hello").unwrap();
        fs::write(temp_dir.path().join("todo.md"), "- [ ] x").unwrap();
        fs::write(temp_dir.path().join("photos/2024/a.jpg"), "jpg").unwrap();

        let root = SandboxRoot::new(temp_dir.path()).unwrap();
        let listing = list_directory(&root.resolve("").unwrap()).unwrap();

        assert_eq!(listing.path, "/");
        assert_eq!(listing.folder_count, 2);
        assert_eq!(listing.file_count, 2);
        assert_eq!(listing.total_size_bytes, 5 + 7);

        let mut folders: Vec<_> = listing.directories.iter().map(|d| d.name.as_str()).collect();
        folders.sort();
        assert_eq!(folders, ["music", "photos"]);

        let notes = listing.files.iter().find(|f| f.name == "notes.txt").unwrap();
        assert_eq!(notes.size, 5);
    }

    #[test]
    fn test_list_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("photos/2024")).unwrap();
        fs::write(temp_dir.path().join("photos/2024/a.jpg"), "jpg").unwrap();

        let root = SandboxRoot::new(temp_dir.path()).unwrap();
        let listing = list_directory(&root.resolve("photos").unwrap()).unwrap();

        assert_eq!(listing.path, "photos");
        assert_eq!(listing.directories, vec![FolderEntry { name: "2024".into() }]);
        assert!(listing.files.is_empty());
        assert_eq!(listing.total_size_bytes, 0);
    }

    #[test]
    fn test_list_missing_or_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "Hello").unwrap();
        let root = SandboxRoot::new(temp_dir.path()).unwrap();

        assert!(matches!(
            list_directory(&root.resolve("missing").unwrap()),
            Err(ExplorerError::NotFound(_))
        ));
        assert!(matches!(
            list_directory(&root.resolve("notes.txt").unwrap()),
            Err(ExplorerError::NotFound(_))
        ));
    }
}
