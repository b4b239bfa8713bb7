//! Transfer module for the file explorer
//!
//! Handles moving and copying entries inside the sandbox and receiving
//! uploaded files.

pub mod file_ops;
pub mod operations;
pub mod results;

// Re-export key types and functions
pub use file_ops::{UploadLimits, UploadSink, is_upload_temp, receive_upload};
pub use operations::{copy_entry, move_entry};
pub use results::{TransferReport, UploadReport};
