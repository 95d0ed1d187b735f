//! Studio Editor
//!
//! Content-editing core of the studio website's admin backend.
//!
//! This library provides:
//! - A typed rich-text document tree with an HTML codec
//! - Transactions with undo/redo
//! - The image node with delete/replace controls
//! - Debounced delete-on-removal callbacks for images
//! - Upload policy, HTTP upload client and a local media library
//! - A line-protocol editing session

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod image;
pub mod media;
pub mod observer;
pub mod session;
pub mod transaction;
pub mod upload;

pub use config::Config;
pub use document::{parse_html, to_html, Document, Node};
pub use editor::Editor;
pub use error::{DocumentError, EditorError, MediaError, RemovalError, UploadError};
pub use observer::{RemovalHandler, RemovalObserver, RemovalTiming};
pub use transaction::Transaction;
pub use upload::{UploadFile, UploadPolicy, Uploader};
