//! Image Uploads
//!
//! The upload collaborator seam, the client-side policy every file passes
//! before it reaches a collaborator, and the HTTP implementation.

pub mod http;
pub mod policy;
pub mod response;

use std::path::Path;

use async_trait::async_trait;

use crate::error::UploadError;

pub use http::HttpMediaClient;
pub use policy::{UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};
pub use response::MediaResponse;

/// A file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Read a file from disk. Without an explicit MIME type it is guessed
    /// from the extension.
    pub async fn from_path(path: &Path, mime: Option<String>) -> Result<Self, UploadError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime.unwrap_or_else(|| mime_from_extension(path).to_string());
        Ok(Self { name, mime, bytes })
    }
}

/// MIME type for common file extensions
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Collaborator that stores a file and returns its public URL
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &UploadFile, category: Option<&str>) -> Result<String, UploadError>;
}
