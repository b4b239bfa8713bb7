//! Storage operations
//!
//! Handles deletion, the upload existence pre-check and download
//! preparation for already resolved paths.

use log::{error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::{ExplorerError, Progress};
use crate::storage::filesystem::{entry_kind, file_exists};
use crate::storage::results::{DeleteOutcome, EntryKind};
use crate::storage::validation::{ResolvedPath, SandboxRoot};

const DELETE_RETRIES: u64 = 3;

/// Deletes a file, or a directory together with everything below it.
///
/// Directory removal is not transactional: if it fails half way the error
/// carries the progress made so far and the remaining entries stay on disk.
pub fn delete_entry(target: &ResolvedPath) -> Result<DeleteOutcome, ExplorerError> {
    if target.is_root() {
        return Err(ExplorerError::InvalidOperation(
            "Cannot delete the root directory".into(),
        ));
    }

    let path = target.as_path();
    match entry_kind(path) {
        Some(EntryKind::File) => {
            remove_file_with_retries(path).map_err(|e| {
                error!(
                    "Failed to delete file {} (real: {}): {}",
                    target.virtual_path(),
                    path.display(),
                    e
                );
                ExplorerError::Internal(e)
            })?;
            info!(
                "Deleted file {} (real: {})",
                target.virtual_path(),
                path.display()
            );
            Ok(DeleteOutcome::FileDeleted)
        }
        Some(EntryKind::Folder) => {
            let mut progress = Progress::default();
            remove_tree(path, &mut progress).map_err(|e| {
                error!(
                    "Failed to delete directory {} (real: {}) after {}: {}",
                    target.virtual_path(),
                    path.display(),
                    progress,
                    e
                );
                ExplorerError::interrupted("delete", progress, e)
            })?;
            info!(
                "Deleted directory {} (real: {}) - {}",
                target.virtual_path(),
                path.display(),
                progress
            );
            Ok(DeleteOutcome::DirectoryDeleted(progress))
        }
        None => Err(ExplorerError::NotFound(format!(
            "File or directory not found: {}",
            target.display_path()
        ))),
    }
}

/// Removes a single file, retrying briefly on permission errors.
fn remove_file_with_retries(path: &Path) -> io::Result<()> {
    let mut attempt = 1;
    loop {
        match fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < DELETE_RETRIES && e.kind() == io::ErrorKind::PermissionDenied => {
                thread::sleep(Duration::from_millis(100 * attempt));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Depth-first removal that counts what it has removed.
fn remove_tree(dir: &Path, progress: &mut Progress) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            remove_tree(&path, progress)?;
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            remove_file_with_retries(&path)?;
            progress.files += 1;
            progress.bytes += size;
        }
    }

    fs::remove_dir(dir)?;
    progress.directories += 1;
    Ok(())
}

/// Answers whether `filename` already exists in `directory`, so the caller
/// can ask before overwriting.
pub fn upload_target_exists(
    root: &SandboxRoot,
    directory: &str,
    filename: &str,
) -> Result<bool, ExplorerError> {
    if directory.trim().is_empty() || filename.trim().is_empty() {
        return Err(ExplorerError::InvalidArgument(
            "Invalid path or filename.".into(),
        ));
    }

    let dir = root.resolve(directory)?;
    let target = root.child(&dir, filename)?;

    Ok(target.as_path().exists())
}

/// Returns the real path of a file that may be streamed to the client.
pub fn prepare_download(target: &ResolvedPath) -> Result<PathBuf, ExplorerError> {
    let path = target.as_path();
    if !file_exists(path) {
        return Err(ExplorerError::NotFound(format!(
            "File not found: {}",
            target.display_path()
        )));
    }

    info!(
        "Prepared download for {} (real: {})",
        target.virtual_path(),
        path.display()
    );

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_structure(dir: &Path) {
        fs::create_dir_all(dir.join("subdir/nested")).unwrap();
        fs::write(dir.join("file.txt"), "Hello").unwrap();
        fs::write(dir.join("subdir/a.txt"), "abc").unwrap();
        fs::write(dir.join("subdir/nested/b.txt"), "defg").unwrap();
    }

    fn sandbox() -> (TempDir, SandboxRoot) {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());
        let root = SandboxRoot::new(temp_dir.path()).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_delete_file() {
        let (temp_dir, root) = sandbox();

        let outcome = delete_entry(&root.resolve("file.txt").unwrap()).unwrap();
        assert_eq!(outcome, DeleteOutcome::FileDeleted);
        assert_eq!(outcome.message(), "File deleted.");
        assert!(!temp_dir.path().join("file.txt").exists());
    }

    #[test]
    fn test_delete_directory_recursively() {
        let (temp_dir, root) = sandbox();

        let outcome = delete_entry(&root.resolve("subdir").unwrap()).unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome::DirectoryDeleted(Progress {
                files: 2,
                directories: 2,
                bytes: 7,
            })
        );
        assert!(!temp_dir.path().join("subdir").exists());
        assert!(temp_dir.path().join("file.txt").exists());
    }

    #[test]
    fn test_delete_missing_is_not_found_every_time() {
        let (_temp_dir, root) = sandbox();
        let target = root.resolve("file.txt").unwrap();

        delete_entry(&target).unwrap();
        for _ in 0..2 {
            assert!(matches!(
                delete_entry(&target),
                Err(ExplorerError::NotFound(_))
            ));
        }
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let (temp_dir, root) = sandbox();

        let result = delete_entry(&root.resolve("/").unwrap());
        assert!(matches!(result, Err(ExplorerError::InvalidOperation(_))));
        assert!(temp_dir.path().join("file.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_symlink_removes_link_only() {
        let (temp_dir, root) = sandbox();
        std::os::unix::fs::symlink(
            temp_dir.path().join("subdir"),
            temp_dir.path().join("link"),
        )
        .unwrap();

        let outcome = delete_entry(&root.resolve("link").unwrap()).unwrap();
        assert_eq!(outcome, DeleteOutcome::FileDeleted);
        assert!(temp_dir.path().join("subdir/a.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_interrupted_midway_reports_progress() {
        use std::os::unix::fs::PermissionsExt;

        let (temp_dir, root) = sandbox();
        let inner = temp_dir.path().join("gone/inner");
        fs::create_dir_all(inner.join("deep")).unwrap();
        fs::write(inner.join("deep/f.txt"), "12345").unwrap();
        fs::set_permissions(&inner, fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(inner.join("writable-check"), "").is_ok() {
            // Permission bits are not enforced (running as root)
            fs::set_permissions(&inner, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = delete_entry(&root.resolve("gone").unwrap());
        fs::set_permissions(&inner, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(ExplorerError::PartialFailure {
                operation,
                progress,
                ..
            }) => {
                assert_eq!(operation, "delete");
                assert_eq!(
                    progress,
                    Progress {
                        files: 1,
                        directories: 0,
                        bytes: 5,
                    }
                );
            }
            other => panic!("expected a partial failure, got {:?}", other),
        }

        assert!(!inner.join("deep/f.txt").exists());
        assert!(inner.join("deep").is_dir());
    }

    #[test]
    fn test_upload_target_exists() {
        let (_temp_dir, root) = sandbox();

        assert!(upload_target_exists(&root, ".", "file.txt").unwrap());
        assert!(upload_target_exists(&root, "subdir", "a.txt").unwrap());
        assert!(!upload_target_exists(&root, "subdir", "missing.txt").unwrap());
    }

    #[test]
    fn test_upload_target_exists_rejects_empty_arguments() {
        let (_temp_dir, root) = sandbox();

        for (dir, name) in [("", "file.txt"), ("subdir", ""), ("  ", "  ")] {
            assert!(matches!(
                upload_target_exists(&root, dir, name),
                Err(ExplorerError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_upload_target_exists_is_sandboxed() {
        let (_temp_dir, root) = sandbox();

        assert!(matches!(
            upload_target_exists(&root, "../..", "passwd"),
            Err(ExplorerError::AccessDenied(_))
        ));
        assert!(matches!(
            upload_target_exists(&root, ".", "../file.txt"),
            Err(ExplorerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_prepare_download() {
        let (temp_dir, root) = sandbox();

        let path = prepare_download(&root.resolve("subdir/a.txt").unwrap()).unwrap();
        assert_eq!(path, root.path().join("subdir/a.txt"));
        assert!(temp_dir.path().join("subdir/a.txt").exists());

        assert!(matches!(
            prepare_download(&root.resolve("subdir").unwrap()),
            Err(ExplorerError::NotFound(_))
        ));
        assert!(matches!(
            prepare_download(&root.resolve("nope.txt").unwrap()),
            Err(ExplorerError::NotFound(_))
        ));
    }
}
