//! Error types shared across the editor.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::NodePath;

/// Failure applying a tree edit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("no node at path {0:?}")]
    InvalidPath(NodePath),
    #[error("node at {path:?} is a {kind}, not an image")]
    NotAnImage { path: NodePath, kind: &'static str },
    #[error("range {start}..{end} is out of bounds for {len} children")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("nesting depth {depth} exceeds the limit of {max}")]
    TooDeep { depth: usize, max: usize },
}

/// Failure uploading a file
#[derive(Debug, Error)]
pub enum UploadError {
    /// Rejected by the client-side size ceiling
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    /// Rejected by the client-side MIME check
    #[error("unsupported file type '{0}', only images can be uploaded")]
    UnsupportedType(String),
    #[error("no upload endpoint configured")]
    Unavailable,
    #[error("upload request failed: {0}")]
    Network(String),
    /// The endpoint answered with `success: false`
    #[error("upload rejected: {0}")]
    Rejected(String),
    #[error("media storage error: {0}")]
    Storage(#[from] MediaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a delete-on-removal callback
#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("delete request failed: {0}")]
    Network(String),
    #[error("delete rejected: {0}")]
    Rejected(String),
    #[error("media storage error: {0}")]
    Media(#[from] MediaError),
}

/// Failure in the local media library
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("url '{0}' does not belong to the media library")]
    ForeignUrl(String),
    #[error("media file not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid category '{0}'")]
    InvalidCategory(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of an editor command
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}
