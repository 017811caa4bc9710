//! Attachment storage: incoming mail scans and generated letters share one
//! directory and are addressed by file name only.

use crate::{error::AppError, AppState};
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use http::header;
use std::path::PathBuf;

const ALLOWED_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "jpg", "jpeg", "png", "txt"];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("file name {0:?} has no usable characters")]
    InvalidFilename(String),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Not Found")]
    NotFound,
}

/// An uploaded file as received from a multipart form.
pub struct Upload {
    pub filename: String,
    pub content: Bytes,
}

/// Extension check only, the content is never inspected.
pub fn is_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Reduces a client supplied file name to `[A-Za-z0-9_.-]`, dropping any
/// directory part so the result always names a file directly inside the
/// upload directory.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect::<String>();
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_owned()
}

pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Writes the upload under its sanitized name and returns that name. An
    /// existing file with the same name is overwritten.
    #[tracing::instrument(skip(self, upload), fields(filename))]
    pub async fn store(&self, upload: Option<Upload>) -> Result<Option<String>, Error> {
        let Some(upload) = upload.filter(|upload| !upload.filename.is_empty()) else {
            return Ok(None);
        };
        let filename = sanitize_filename(&upload.filename);
        if filename.is_empty() {
            return Err(Error::InvalidFilename(upload.filename));
        }
        tracing::Span::current().record("filename", filename.as_str());
        self.ensure_exists().await?;
        let path = self.root.join(&filename);
        tokio::fs::write(&path, &upload.content)
            .await
            .map_err(|source| Error::Io { path, source })?;
        tracing::info!("stored upload of {} bytes", upload.content.len());
        Ok(Some(filename))
    }

    pub async fn ensure_exists(&self) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| Error::Io {
                path: self.root.clone(),
                source,
            })
    }

    /// Reads a stored file. Anything that is not a plain file name, such as a
    /// path with separators or `..`, is reported as not found.
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, Error> {
        if filename.is_empty() || sanitize_filename(filename) != filename {
            return Err(Error::NotFound);
        }
        let path = self.root.join(filename);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound),
            Err(source) => Err(Error::Io { path, source }),
        }
    }
}

fn content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain; charset=utf-8",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

pub async fn get(
    State(app_state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let content = app_state.uploads.read(&filename).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename).to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        content,
    )
        .into_response())
}
