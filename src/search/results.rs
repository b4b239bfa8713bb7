//! Result types for search operations

use serde::Serialize;

use crate::storage::EntryKind;

/// A single matching file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub name: String,
    /// Path relative to the root, `/`-separated.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    pub result_count: usize,
    /// Matches found before the result cap was applied.
    pub total_matches: usize,
    pub truncated: bool,
    pub results: Vec<SearchHit>,
}
