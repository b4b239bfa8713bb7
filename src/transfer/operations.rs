//! Transfer operations
//!
//! Moves and copies files or whole folders between directories inside the
//! sandbox. Every check runs on resolved paths before anything is touched.

use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ExplorerError, Progress};
use crate::storage::filesystem::{directory_exists, entry_kind};
use crate::storage::validation::{ResolvedPath, SandboxRoot};
use crate::storage::EntryKind;
use crate::transfer::results::TransferReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferMode {
    Move,
    Copy,
}

impl TransferMode {
    fn verb(self) -> &'static str {
        match self {
            TransferMode::Move => "move",
            TransferMode::Copy => "copy",
        }
    }
}

/// A validated transfer, ready to execute.
#[derive(Debug)]
struct TransferPlan {
    kind: EntryKind,
    destination: ResolvedPath,
}

/// Validates a transfer of `source` into `destination_dir`.
///
/// The final destination is `destination_dir/<name of source>` and must
/// itself pass the sandbox check.
fn plan_transfer(
    root: &SandboxRoot,
    source: &ResolvedPath,
    destination_dir: &ResolvedPath,
    mode: TransferMode,
) -> Result<TransferPlan, ExplorerError> {
    let name = source.file_name().ok_or_else(|| {
        ExplorerError::InvalidOperation(format!("Cannot {} the root directory", mode.verb()))
    })?;
    let destination = root.child(destination_dir, name)?;

    let kind = entry_kind(source.as_path());

    if kind == Some(EntryKind::Folder) && destination.is_within(source) {
        return Err(ExplorerError::InvalidOperation(format!(
            "Cannot {} a folder into itself or its own subfolder",
            mode.verb()
        )));
    }

    let kind = kind.ok_or_else(|| {
        ExplorerError::NotFound(format!("Source not found: {}", source.display_path()))
    })?;

    if !directory_exists(destination_dir.as_path()) {
        return Err(ExplorerError::NotFound(format!(
            "Destination directory not found: {}",
            destination_dir.display_path()
        )));
    }

    match (kind, entry_kind(destination.as_path())) {
        (_, Some(EntryKind::Folder)) => {
            return Err(ExplorerError::DestinationExists(format!(
                "Destination folder already exists: {}",
                destination.display_path()
            )));
        }
        (EntryKind::Folder, Some(EntryKind::File)) => {
            return Err(ExplorerError::DestinationExists(format!(
                "A file with that name already exists: {}",
                destination.display_path()
            )));
        }
        _ => {}
    }

    Ok(TransferPlan { kind, destination })
}

/// Moves a file or folder into `destination_dir`.
///
/// A file replaces an existing file of the same name; a folder is renamed
/// in one step and never merged into an existing folder.
pub fn move_entry(
    root: &SandboxRoot,
    source: &ResolvedPath,
    destination_dir: &ResolvedPath,
) -> Result<TransferReport, ExplorerError> {
    let plan = plan_transfer(root, source, destination_dir, TransferMode::Move)?;
    let destination = &plan.destination;

    if destination == source {
        info!("Move of {} onto itself ignored", source.virtual_path());
        return Ok(TransferReport {
            kind: plan.kind,
            destination: destination.display_path().to_string(),
            progress: Progress::default(),
        });
    }

    fs::rename(source.as_path(), destination.as_path()).map_err(|e| {
        error!(
            "Failed to move {} to {} (real: {} -> {}): {}",
            source.virtual_path(),
            destination.virtual_path(),
            source.as_path().display(),
            destination.as_path().display(),
            e
        );
        ExplorerError::Internal(e)
    })?;

    let progress = match plan.kind {
        EntryKind::File => Progress {
            files: 1,
            ..Progress::default()
        },
        EntryKind::Folder => Progress {
            directories: 1,
            ..Progress::default()
        },
    };

    info!(
        "Moved {} to {}",
        source.virtual_path(),
        destination.virtual_path()
    );

    Ok(TransferReport {
        kind: plan.kind,
        destination: destination.display_path().to_string(),
        progress,
    })
}

/// Copies a file or a whole folder into `destination_dir`.
///
/// Folder copies are best effort: on an I/O error the copy stops, whatever
/// was already written stays, and the error reports how far it got.
pub fn copy_entry(
    root: &SandboxRoot,
    source: &ResolvedPath,
    destination_dir: &ResolvedPath,
) -> Result<TransferReport, ExplorerError> {
    let plan = plan_transfer(root, source, destination_dir, TransferMode::Copy)?;
    let destination = &plan.destination;

    if destination == source {
        return Err(ExplorerError::InvalidOperation(
            "Source and destination are the same file".into(),
        ));
    }

    let mut progress = Progress::default();
    let result = match plan.kind {
        EntryKind::File => fs::copy(source.as_path(), destination.as_path()).map(|bytes| {
            progress.files = 1;
            progress.bytes = bytes;
        }),
        EntryKind::Folder => copy_tree(source.as_path(), destination.as_path(), &mut progress),
    };

    result.map_err(|e| {
        error!(
            "Failed to copy {} to {} after {}: {}",
            source.virtual_path(),
            destination.virtual_path(),
            progress,
            e
        );
        ExplorerError::interrupted("copy", progress, e)
    })?;

    info!(
        "Copied {} to {} - {}",
        source.virtual_path(),
        destination.virtual_path(),
        progress
    );

    Ok(TransferReport {
        kind: plan.kind,
        destination: destination.display_path().to_string(),
        progress,
    })
}

/// Creates `destination`, copies the files directly inside `source`, then
/// recurses into each subfolder. Symlinks are never copied or followed.
fn copy_tree(source: &Path, destination: &Path, progress: &mut Progress) -> io::Result<()> {
    fs::create_dir_all(destination)?;
    progress.directories += 1;

    let mut subdirectories = Vec::new();

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = destination.join(entry.file_name());

        if file_type.is_dir() {
            subdirectories.push((entry.path(), target));
            continue;
        }

        if file_type.is_symlink() {
            warn!("Skipping symlink {}", entry.path().display());
            continue;
        }

        progress.bytes += fs::copy(entry.path(), &target)?;
        progress.files += 1;
    }

    for (source_dir, target_dir) in subdirectories {
        copy_tree(&source_dir, &target_dir, progress)?;
    }

    Ok(())
}
