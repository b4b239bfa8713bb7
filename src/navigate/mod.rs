//! Navigate module
//!
//! Directory listings for the file explorer.

mod operations;
mod results;

pub use operations::list_directory;
pub use results::{DirectoryListing, FileEntry, FolderEntry};
