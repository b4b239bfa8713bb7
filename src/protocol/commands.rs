//! Module `commands`
//!
//! Query parameters accepted by the file explorer API. Every path is a
//! client-relative string that still has to go through the resolver.

use serde::Deserialize;

/// `?path=` on download and delete
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

/// `?path=&filename=` on the upload pre-check
#[derive(Debug, Default, Deserialize)]
pub struct ExistsQuery {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub filename: String,
}

/// `?q=` on search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `?sourcePath=&destinationPath=` on move and copy
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuery {
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub destination_path: String,
}
