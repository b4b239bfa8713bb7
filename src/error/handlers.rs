//! Error handlers
//!
//! Maps explorer errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::json;

use crate::error::types::ExplorerError;

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::AccessDenied(_) => StatusCode::FORBIDDEN,
        ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
        ExplorerError::InvalidArgument(_)
        | ExplorerError::InvalidQuery(_)
        | ExplorerError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
        ExplorerError::DestinationExists(_) => StatusCode::CONFLICT,
        ExplorerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ExplorerError::PartialFailure { .. } | ExplorerError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Log an explorer error at a level matching its severity
pub fn handle_error(err: &ExplorerError) {
    match err {
        ExplorerError::PartialFailure { .. } | ExplorerError::Internal(_) => {
            error!("File explorer error: {}", err)
        }
        ExplorerError::AccessDenied(_) => warn!("Rejected request: {}", err),
        _ => {}
    }
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        handle_error(&self);

        let status = error_to_status_code(&self);
        let mut body = json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(progress) = self.progress() {
            body["progress"] = json!(progress);
        }

        (status, Json(body)).into_response()
    }
}
