use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Failures a handler cannot recover from locally.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("store: {0}")]
    Store(#[from] arsip_db::Error),
    #[error("template: {0}")]
    Template(#[from] askama::Error),
    #[error("upload: {0}")]
    Upload(#[from] crate::uploads::Error),
    #[error("session: {0}")]
    Session(String),
    #[error("multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(arsip_db::Error::NotFound)
            | Self::Upload(crate::uploads::Error::NotFound) => StatusCode::NOT_FOUND,
            Self::Multipart(err) => err.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected with {status_code}: {self}");
        }
        let reason = status_code.canonical_reason().unwrap_or("unknown");
        (status_code, format!("{}: {reason}", status_code.as_str())).into_response()
    }
}
