//! File system storage management
//!
//! Handles path validation, deletion, upload pre-checks and download
//! preparation.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{delete_entry, prepare_download, upload_target_exists};
pub use results::{DeleteOutcome, EntryKind};
pub use validation::{ResolvedPath, SandboxRoot};
