//! Editor Document
//!
//! The rich-text document model: a tree of typed nodes, plus the HTML
//! codec used to persist it as article content.

pub mod html;
pub mod node;
pub mod parse;

pub use html::to_html;
pub use node::{Document, ImageAttrs, Inline, Marks, Node, NodePath, TextRun, MAX_DEPTH};
pub use parse::parse_html;
