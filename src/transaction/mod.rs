//! Transactions
//!
//! Atomic, observable edits of the document tree. A transaction is a list
//! of steps applied to a copy of the document; if any step fails the
//! document is left untouched.

pub mod history;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Node, NodePath, MAX_DEPTH};
use crate::error::DocumentError;

pub use history::{Entry, History};

/// A single tree edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Insert a node so that it ends up at `path`
    Insert { path: NodePath, node: Node },
    /// Remove the node at `path`
    Remove { path: NodePath },
    /// Remove children `start..end` of the node at `parent` (selection cut)
    RemoveRange {
        parent: NodePath,
        start: usize,
        end: usize,
    },
    /// Remove the node at `from`, then insert it at `to` (drag reorder).
    /// `to` is resolved after the removal.
    Move { from: NodePath, to: NodePath },
    /// Swap the whole node at `path`
    Replace { path: NodePath, node: Node },
    SetImageSrc { path: NodePath, src: String },
    SetImageAlt { path: NodePath, alt: String },
}

/// An ordered group of steps applied atomically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub steps: Vec<Step>,
}

/// Outcome of applying a transaction: the documents on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub before: Document,
    pub after: Document,
}

impl Applied {
    /// Whether the transaction changed content
    pub fn doc_changed(&self) -> bool {
        self.before != self.after
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn insert(self, path: NodePath, node: Node) -> Self {
        self.step(Step::Insert { path, node })
    }

    pub fn remove(self, path: NodePath) -> Self {
        self.step(Step::Remove { path })
    }

    pub fn remove_range(self, parent: NodePath, start: usize, end: usize) -> Self {
        self.step(Step::RemoveRange { parent, start, end })
    }

    pub fn move_node(self, from: NodePath, to: NodePath) -> Self {
        self.step(Step::Move { from, to })
    }

    pub fn replace(self, path: NodePath, node: Node) -> Self {
        self.step(Step::Replace { path, node })
    }

    pub fn set_image_src(self, path: NodePath, src: impl Into<String>) -> Self {
        self.step(Step::SetImageSrc {
            path,
            src: src.into(),
        })
    }

    pub fn set_image_alt(self, path: NodePath, alt: impl Into<String>) -> Self {
        self.step(Step::SetImageAlt {
            path,
            alt: alt.into(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply all steps to a copy of `doc`
    pub fn apply(&self, doc: &Document) -> Result<Applied, DocumentError> {
        let mut after = doc.clone();
        for step in &self.steps {
            apply_step(&mut after, step)?;
        }
        Ok(Applied {
            before: doc.clone(),
            after,
        })
    }
}

fn apply_step(doc: &mut Document, step: &Step) -> Result<(), DocumentError> {
    match step {
        Step::Insert { path, node } => insert_node(doc, path, node.clone()),
        Step::Remove { path } => remove_node(doc, path).map(drop),
        Step::RemoveRange { parent, start, end } => {
            let children = doc
                .children_at_mut(parent)
                .ok_or_else(|| DocumentError::InvalidPath(parent.clone()))?;
            if start > end || *end > children.len() {
                return Err(DocumentError::InvalidRange {
                    start: *start,
                    end: *end,
                    len: children.len(),
                });
            }
            children.drain(*start..*end);
            Ok(())
        }
        Step::Move { from, to } => {
            let node = remove_node(doc, from)?;
            insert_node(doc, to, node)
        }
        Step::Replace { path, node } => {
            check_depth(path.len().saturating_sub(1), node)?;
            let slot = doc
                .get_mut(path)
                .ok_or_else(|| DocumentError::InvalidPath(path.clone()))?;
            *slot = node.clone();
            Ok(())
        }
        Step::SetImageSrc { path, src } => {
            image_at(doc, path)?.src = src.clone();
            Ok(())
        }
        Step::SetImageAlt { path, alt } => {
            image_at(doc, path)?.alt = alt.clone();
            Ok(())
        }
    }
}

fn split_path(path: &[usize]) -> Result<(&[usize], usize), DocumentError> {
    path.split_last()
        .map(|(&idx, parent)| (parent, idx))
        .ok_or_else(|| DocumentError::InvalidPath(path.to_vec()))
}

fn check_depth(parent_depth: usize, node: &Node) -> Result<(), DocumentError> {
    let depth = parent_depth + node.depth();
    if depth > MAX_DEPTH {
        return Err(DocumentError::TooDeep {
            depth,
            max: MAX_DEPTH,
        });
    }
    Ok(())
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), DocumentError> {
    let (parent, idx) = split_path(path)?;
    check_depth(parent.len(), &node)?;
    let children = doc
        .children_at_mut(parent)
        .filter(|children| idx <= children.len())
        .ok_or_else(|| DocumentError::InvalidPath(path.to_vec()))?;
    children.insert(idx, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, DocumentError> {
    let (parent, idx) = split_path(path)?;
    let children = doc
        .children_at_mut(parent)
        .filter(|children| idx < children.len())
        .ok_or_else(|| DocumentError::InvalidPath(path.to_vec()))?;
    Ok(children.remove(idx))
}

fn image_at<'a>(
    doc: &'a mut Document,
    path: &[usize],
) -> Result<&'a mut crate::document::ImageAttrs, DocumentError> {
    match doc.get_mut(path) {
        Some(Node::Image(attrs)) => Ok(attrs),
        Some(other) => Err(DocumentError::NotAnImage {
            path: path.to_vec(),
            kind: other.kind(),
        }),
        None => Err(DocumentError::InvalidPath(path.to_vec())),
    }
}
