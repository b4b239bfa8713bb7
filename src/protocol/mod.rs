//! HTTP protocol implementation
//!
//! Routes the file explorer API onto the sandboxed filesystem operations.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use std::sync::Arc;

use crate::middleware::logging::log_request;
use crate::storage::SandboxRoot;
use crate::transfer::UploadLimits;

/// Extra room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub root: Arc<SandboxRoot>,
    pub limits: UploadLimits,
}

impl AppState {
    pub fn new(root: SandboxRoot, limits: UploadLimits) -> Self {
        Self {
            root: Arc::new(root),
            limits,
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.limits.max_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/fileexplorer", get(handlers::list_root))
        .route("/api/fileexplorer/", get(handlers::list_root))
        .route("/api/fileexplorer/search", get(handlers::search))
        .route("/api/fileexplorer/download", get(handlers::download))
        .route("/api/fileexplorer/exists", get(handlers::exists))
        .route("/api/fileexplorer/upload", post(handlers::upload))
        .route("/api/fileexplorer/delete", delete(handlers::delete))
        .route("/api/fileexplorer/move", post(handlers::move_item))
        .route("/api/fileexplorer/copy", post(handlers::copy_item))
        .route("/api/fileexplorer/{*path}", get(handlers::list_path))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
