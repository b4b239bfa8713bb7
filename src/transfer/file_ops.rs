//! Module `file_ops`
//!
//! Receives uploaded files into a directory inside the sandbox. Bytes are
//! written to a hidden temporary file in the target directory and persisted
//! over the final name only once the whole upload has arrived.

use log::{error, info, warn};
use std::io::{self, Read, Write};
use tempfile::{Builder, NamedTempFile};

use crate::error::ExplorerError;
use crate::storage::filesystem::directory_exists;
use crate::storage::validation::{ResolvedPath, SandboxRoot};
use crate::transfer::results::UploadReport;

const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024; // 100MB in bytes
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Name prefix of in-flight upload files. Listings and search skip them.
pub const UPLOAD_TEMP_PREFIX: &str = ".rax-upload-";
const UPLOAD_TEMP_SUFFIX: &str = ".part";

/// Size limits applied while receiving an upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_bytes: u64,
    pub buffer_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_FILE_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// True for the temporary files uploads write into before they complete.
pub fn is_upload_temp(name: &str) -> bool {
    name.starts_with(UPLOAD_TEMP_PREFIX)
}

/// An upload being written chunk by chunk.
///
/// Dropping the sink before `finish` removes the temporary file, so a failed
/// or abandoned upload never touches the existing target.
#[derive(Debug)]
pub struct UploadSink {
    target: ResolvedPath,
    temp_file: NamedTempFile,
    written: u64,
    limits: UploadLimits,
}

impl UploadSink {
    /// Opens a temporary file for `directory/filename`.
    ///
    /// The file name is used verbatim but must be a single path segment.
    pub fn create(
        root: &SandboxRoot,
        directory: &ResolvedPath,
        filename: &str,
        limits: UploadLimits,
    ) -> Result<Self, ExplorerError> {
        if !directory_exists(directory.as_path()) {
            return Err(ExplorerError::InvalidOperation(format!(
                "Invalid upload path: {}",
                directory.display_path()
            )));
        }

        let target = root.child(directory, filename)?;
        if target.as_path().is_dir() {
            return Err(ExplorerError::DestinationExists(format!(
                "A folder with that name already exists: {}",
                target.display_path()
            )));
        }

        let temp_file = Builder::new()
            .prefix(UPLOAD_TEMP_PREFIX)
            .suffix(UPLOAD_TEMP_SUFFIX)
            .tempfile_in(directory.as_path())
            .map_err(|e| {
                error!(
                    "Failed to create temporary file in {}: {}",
                    directory.as_path().display(),
                    e
                );
                ExplorerError::Internal(e)
            })?;

        info!(
            "Starting upload: {} -> {}",
            temp_file.path().display(),
            target.as_path().display()
        );

        Ok(Self {
            target,
            temp_file,
            written: 0,
            limits,
        })
    }

    /// Appends `chunk`, failing as soon as the size limit is crossed.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ExplorerError> {
        // Check file size limit BEFORE writing (fail fast)
        let total_bytes = self.written.saturating_add(chunk.len() as u64);
        if total_bytes > self.limits.max_bytes {
            warn!(
                "File size limit exceeded: {} bytes > {} bytes",
                total_bytes, self.limits.max_bytes
            );
            return Err(ExplorerError::PayloadTooLarge(format!(
                "File too large, maximum is {} bytes",
                self.limits.max_bytes
            )));
        }

        self.temp_file.write_all(chunk).map_err(|e| {
            error!("Failed to write upload data: {}", e);
            ExplorerError::Internal(e)
        })?;
        self.written = total_bytes;
        Ok(())
    }

    /// Bytes accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes the data and replaces the target with it.
    pub fn finish(mut self) -> Result<UploadReport, ExplorerError> {
        if self.written == 0 {
            return Err(ExplorerError::InvalidOperation("No file uploaded.".into()));
        }

        if let Err(e) = self
            .temp_file
            .flush()
            .and_then(|_| self.temp_file.as_file().sync_all())
        {
            error!(
                "Failed to flush temporary file {}: {}",
                self.temp_file.path().display(),
                e
            );
            return Err(ExplorerError::Internal(e));
        }

        let final_path = self.target.as_path();
        if let Err(e) = self.temp_file.persist(final_path) {
            error!("Failed to persist upload to {}: {}", final_path.display(), e);
            return Err(ExplorerError::Internal(e.error));
        }

        info!(
            "Upload completed: {} ({} bytes)",
            final_path.display(),
            self.written
        );

        Ok(UploadReport {
            path: self.target.display_path().to_string(),
            size: self.written,
        })
    }
}

/// Stores the contents of `data` as `directory/filename`.
///
/// An existing file of the same name is replaced without asking; callers
/// that want confirmation check `upload_target_exists` first.
pub fn receive_upload<R: Read>(
    root: &SandboxRoot,
    directory: &ResolvedPath,
    filename: &str,
    mut data: R,
    limits: UploadLimits,
) -> Result<UploadReport, ExplorerError> {
    let mut sink = UploadSink::create(root, directory, filename, limits)?;
    let mut buffer = vec![0; limits.buffer_size.max(1)];

    loop {
        let n = match data.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Read failure during upload: {}", e);
                return Err(ExplorerError::Internal(e));
            }
        };
        sink.write_chunk(&buffer[..n])?;
    }

    sink.finish()
}
