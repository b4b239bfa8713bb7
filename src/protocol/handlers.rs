//! Request handlers for the file explorer API.
//!
//! Each handler parses its parameters, resolves every client path through
//! the sandbox root, and runs the blocking filesystem work on the blocking
//! thread pool.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{info, warn};
use std::io::{self, SeekFrom};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::error::ExplorerError;
use crate::navigate::{DirectoryListing, list_directory};
use crate::protocol::AppState;
use crate::protocol::commands::{ExistsQuery, PathQuery, SearchQuery, TransferQuery};
use crate::protocol::parser::{attachment_name, sanitize_upload_name};
use crate::protocol::responses::{
    DeleteResponse, ExistsResponse, STATUS_OK, TransferResponse, UploadResponse,
};
use crate::search::{SearchResults, search_tree};
use crate::storage::filesystem::entry_name;
use crate::storage::{delete_entry, prepare_download, upload_target_exists};
use crate::transfer::{
    UploadLimits, UploadReport, UploadSink, copy_entry, move_entry, receive_upload,
};

type ApiResult<T> = Result<T, ExplorerError>;

/// Runs filesystem work off the async executor.
async fn run_blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ExplorerError::Internal(io::Error::other(e)))?
}

/// `GET /api/fileexplorer/`
pub async fn list_root(State(state): State<AppState>) -> ApiResult<Json<DirectoryListing>> {
    list(state, String::new()).await
}

/// `GET /api/fileexplorer/{*path}`
pub async fn list_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Json<DirectoryListing>> {
    list(state, path).await
}

async fn list(state: AppState, relative: String) -> ApiResult<Json<DirectoryListing>> {
    let listing = run_blocking(move || {
        let target = state.root.resolve(&relative)?;
        list_directory(&target)
    })
    .await?;

    Ok(Json(listing))
}

/// `GET /api/fileexplorer/search?q=`
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResults>> {
    let results = run_blocking(move || search_tree(&state.root, &query.q)).await?;
    Ok(Json(results))
}

/// `GET /api/fileexplorer/download?path=`
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Response> {
    let real_path = run_blocking(move || {
        let target = state.root.resolve(&query.path)?;
        prepare_download(&target)
    })
    .await?;

    let file = tokio::fs::File::open(&real_path).await?;
    let content_type = mime_guess::from_path(&real_path)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(&entry_name(&real_path))
    );

    info!("Streaming download of {}", real_path.display());

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `GET /api/fileexplorer/exists?path=&filename=`
pub async fn exists(
    State(state): State<AppState>,
    Query(query): Query<ExistsQuery>,
) -> ApiResult<Json<ExistsResponse>> {
    let exists =
        run_blocking(move || upload_target_exists(&state.root, &query.path, &query.filename))
            .await?;
    Ok(Json(ExistsResponse { exists }))
}

/// `POST /api/fileexplorer/upload` with multipart fields `path` and `file`
///
/// When `path` arrives first the file is streamed straight into the target
/// directory. Browsers may send `file` first, in which case it is spooled to
/// an anonymous temporary file until the directory is known.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut directory: Option<String> = None;
    let mut spooled = None;
    let mut report = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("path") => directory = Some(field.text().await.map_err(multipart_error)?),
            Some("file") => {
                let filename = field.file_name().map(sanitize_upload_name).unwrap_or_default();
                match &directory {
                    Some(dir) => {
                        report =
                            Some(stream_upload(&state, dir.clone(), filename, &mut field).await?);
                        spooled = None;
                    }
                    None => {
                        spooled = Some((filename, spool_field(&mut field, state.limits).await?));
                        report = None;
                    }
                }
            }
            _ => {}
        }
    }

    let report = match (report, spooled) {
        (Some(report), _) => report,
        (None, Some((filename, file))) => {
            let directory = directory.unwrap_or_default();
            run_blocking(move || {
                let target_dir = state.root.resolve(&directory)?;
                receive_upload(&state.root, &target_dir, &filename, file, state.limits)
            })
            .await?
        }
        (None, None) => return Err(ExplorerError::InvalidOperation("No file uploaded.".into())),
    };

    Ok(Json(UploadResponse {
        status: STATUS_OK,
        message: "File uploaded successfully!",
        report,
    }))
}

/// Writes the chunks of `field` into an upload sink for `directory/filename`.
async fn stream_upload(
    state: &AppState,
    directory: String,
    filename: String,
    field: &mut Field<'_>,
) -> ApiResult<UploadReport> {
    let (root, limits) = (state.root.clone(), state.limits);
    let mut sink = run_blocking(move || {
        let target_dir = root.resolve(&directory)?;
        UploadSink::create(&root, &target_dir, &filename, limits)
    })
    .await?;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        sink = run_blocking(move || {
            sink.write_chunk(&chunk)?;
            Ok(sink)
        })
        .await?;
    }

    run_blocking(move || sink.finish()).await
}

/// Buffers `field` in an unnamed temporary file, enforcing the size limit
/// per chunk, and returns it rewound.
async fn spool_field(field: &mut Field<'_>, limits: UploadLimits) -> ApiResult<std::fs::File> {
    let spool = run_blocking(|| tempfile::tempfile().map_err(ExplorerError::Internal)).await?;
    let mut spool = tokio::fs::File::from_std(spool);
    let mut total_bytes = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        total_bytes = total_bytes.saturating_add(chunk.len() as u64);
        if total_bytes > limits.max_bytes {
            warn!(
                "File size limit exceeded: {} bytes > {} bytes",
                total_bytes, limits.max_bytes
            );
            return Err(ExplorerError::PayloadTooLarge(format!(
                "File too large, maximum is {} bytes",
                limits.max_bytes
            )));
        }
        spool.write_all(&chunk).await?;
    }

    spool.flush().await?;
    spool.seek(SeekFrom::Start(0)).await?;
    Ok(spool.into_std().await)
}

fn multipart_error(err: MultipartError) -> ExplorerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ExplorerError::PayloadTooLarge(err.body_text())
    } else {
        ExplorerError::InvalidArgument(err.body_text())
    }
}

/// `DELETE /api/fileexplorer/delete?path=`
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let outcome = run_blocking(move || {
        let target = state.root.resolve(&query.path)?;
        delete_entry(&target)
    })
    .await?;

    Ok(Json(DeleteResponse {
        status: STATUS_OK,
        message: outcome.message(),
        kind: outcome.kind(),
        progress: outcome.progress(),
    }))
}

/// `POST /api/fileexplorer/move?sourcePath=&destinationPath=`
pub async fn move_item(
    State(state): State<AppState>,
    Query(query): Query<TransferQuery>,
) -> ApiResult<Json<TransferResponse>> {
    let report = run_blocking(move || {
        let source = state.root.resolve(&query.source_path)?;
        let destination = state.root.resolve(&query.destination_path)?;
        move_entry(&state.root, &source, &destination)
    })
    .await?;

    Ok(Json(TransferResponse {
        status: STATUS_OK,
        message: format!("Moved to {}", report.destination),
        report,
    }))
}

/// `POST /api/fileexplorer/copy?sourcePath=&destinationPath=`
pub async fn copy_item(
    State(state): State<AppState>,
    Query(query): Query<TransferQuery>,
) -> ApiResult<Json<TransferResponse>> {
    let report = run_blocking(move || {
        let source = state.root.resolve(&query.source_path)?;
        let destination = state.root.resolve(&query.destination_path)?;
        copy_entry(&state.root, &source, &destination)
    })
    .await?;

    Ok(Json(TransferResponse {
        status: STATUS_OK,
        message: format!("Copied to {}", report.destination),
        report,
    }))
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    "rax-file-explorer ok"
}
