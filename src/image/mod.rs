//! Image Node
//!
//! The custom image node: its view with delete/replace controls and the
//! tree edits those controls perform.

pub mod view;

pub use view::{render, render_node, Control, View};

use crate::document::{Document, ImageAttrs, Node};
use crate::error::DocumentError;
use crate::transaction::Transaction;

/// Image attributes at `path`, or an error naming what is there instead
pub fn image_at<'a>(doc: &'a Document, path: &[usize]) -> Result<&'a ImageAttrs, DocumentError> {
    match doc.get(path) {
        Some(Node::Image(attrs)) => Ok(attrs),
        Some(other) => Err(DocumentError::NotAnImage {
            path: path.to_vec(),
            kind: other.kind(),
        }),
        None => Err(DocumentError::InvalidPath(path.to_vec())),
    }
}

/// Delete control: remove the image node. Storage cleanup is left to the
/// removal observer.
pub fn delete_transaction(doc: &Document, path: &[usize]) -> Result<Transaction, DocumentError> {
    image_at(doc, path)?;
    Ok(Transaction::new().remove(path.to_vec()))
}

/// Replace control: point the image at a freshly uploaded file in place
pub fn replace_transaction(
    doc: &Document,
    path: &[usize],
    src: &str,
) -> Result<Transaction, DocumentError> {
    image_at(doc, path)?;
    Ok(Transaction::new().set_image_src(path.to_vec(), src))
}
