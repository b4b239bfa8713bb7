//! Response bodies
//!
//! JSON payloads returned by successful requests. Errors are rendered by
//! `error::handlers`.

use serde::Serialize;

use crate::error::Progress;
use crate::storage::EntryKind;
use crate::transfer::{TransferReport, UploadReport};

pub const STATUS_OK: &str = "ok";

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub report: TransferReport,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(flatten)]
    pub report: UploadReport,
}
