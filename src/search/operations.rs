//! Search operations implementation
//!
//! Walks the entire tree on every call; there is no index.

use log::{info, warn};
use std::fs;
use walkdir::WalkDir;

use crate::error::ExplorerError;
use crate::search::results::{SearchHit, SearchResults};
use crate::storage::EntryKind;
use crate::storage::SandboxRoot;
use crate::transfer::is_upload_temp;

pub const MAX_SEARCH_RESULTS: usize = 100;

/// Finds every file and folder under the root whose name contains `query`,
/// ignoring case. Folders come first, then files, each in walk order, and
/// the combined list is cut at [`MAX_SEARCH_RESULTS`].
///
/// Symlinks are classified by their target, as in directory listings, but
/// the walk never descends through them.
pub fn search_tree(root: &SandboxRoot, query: &str) -> Result<SearchResults, ExplorerError> {
    if query.trim().is_empty() {
        return Err(ExplorerError::InvalidQuery(
            "Search query cannot be empty".into(),
        ));
    }

    let needle = query.to_lowercase();
    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in WalkDir::new(root.path()).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry during search: {}", e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if is_upload_temp(&name) || !name.to_lowercase().contains(&needle) {
            continue;
        }

        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping {} during search: {}", entry.path().display(), e);
                continue;
            }
        };

        let path = root.virtual_path_of(entry.path());
        if metadata.is_dir() {
            folders.push(SearchHit {
                name,
                path,
                size: None,
                kind: EntryKind::Folder,
            });
        } else {
            files.push(SearchHit {
                name,
                path,
                size: Some(metadata.len()),
                kind: EntryKind::File,
            });
        }
    }

    let total_matches = folders.len() + files.len();
    let results: Vec<SearchHit> = folders
        .into_iter()
        .chain(files)
        .take(MAX_SEARCH_RESULTS)
        .collect();

    info!(
        "Search for {:?} matched {} entries, returning {}",
        query,
        total_matches,
        results.len()
    );

    Ok(SearchResults {
        query: query.to_string(),
        result_count: results.len(),
        total_matches,
        truncated: total_matches > results.len(),
        results,
    })
}
