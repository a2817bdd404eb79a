//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use folio_site::ResolveError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No page is routed at the given path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Page resolution failed.
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Preview requested without a valid secret.
    #[error("Invalid preview secret")]
    InvalidPreviewSecret,

    /// Malformed preview request.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::PageNotFound(path) => {
                tracing::debug!(path = %path, "Page not found");
                (
                    StatusCode::NOT_FOUND,
                    Html("<!DOCTYPE html>\n<title>404</title>\n<h1>404 - Page Not Found</h1>\n"),
                )
                    .into_response()
            }
            Self::Resolve(_) | Self::Task(_) => {
                tracing::error!(error = %self, "Failed to render page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<!DOCTYPE html>\n<title>500</title>\n<h1>500 - Server Error</h1>\n"),
                )
                    .into_response()
            }
            Self::InvalidPreviewSecret => {
                (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()).into_response(),
        }
    }
}
