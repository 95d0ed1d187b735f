//! Line Protocol
//!
//! One JSON object per line in each direction: requests tagged by `op`,
//! events tagged by `event`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::NodePath;
use crate::image::View;
use crate::media::MediaItem;

/// A request from the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Open a document from stored HTML
    Load { html: String },
    Html,
    Render,
    DeleteImage { path: NodePath },
    DeleteNode { path: NodePath },
    /// Remove children `start..end` of `parent` (root when omitted)
    Cut {
        #[serde(default)]
        parent: NodePath,
        start: usize,
        end: usize,
    },
    MoveNode { from: NodePath, to: NodePath },
    ReplaceImage {
        path: NodePath,
        file: PathBuf,
        #[serde(default)]
        mime: Option<String>,
    },
    InsertImage {
        path: NodePath,
        file: PathBuf,
        #[serde(default)]
        mime: Option<String>,
        #[serde(default)]
        alt: String,
    },
    SetAlt { path: NodePath, alt: String },
    Undo,
    Redo,
    ListMedia {
        #[serde(default)]
        category: Option<String>,
    },
}

/// Severity of a notice shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// An event for the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The document changed; `html` is the content to persist
    Changed { html: String },
    /// Reply to `html`
    Html { html: String },
    /// Reply to `render`
    View { nodes: Vec<View> },
    /// Transient notification for the user
    Notice { level: NoticeLevel, message: String },
    /// A removed image's file was deleted from storage
    ImageDeleted { url: String },
    Uploaded { url: String },
    /// Reply to `list_media`
    Media { items: Vec<MediaItem> },
    /// The request could not be carried out
    Error { message: String },
}

impl Event {
    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        Event::Notice {
            level,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Event::Error {
            message: message.into(),
        }
    }
}
