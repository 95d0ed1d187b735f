//! Node Views
//!
//! Rendering is a pure function from the document tree to a view
//! description. Image nodes carry their hover controls.

use serde::Serialize;

use crate::document::html::{inline_html, text_html};
use crate::document::{Document, Node, NodePath};

/// Hover control shown over an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Delete,
    Replace,
}

/// Controls every image node exposes
pub const IMAGE_CONTROLS: [Control; 2] = [Control::Delete, Control::Replace];

/// View description of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// Container rendered as `tag` around its children
    Block {
        tag: String,
        path: NodePath,
        children: Vec<View>,
    },
    /// Leaf with inline content, pre-rendered as HTML
    Text {
        tag: String,
        path: NodePath,
        html: String,
    },
    Rule {
        path: NodePath,
    },
    Image {
        path: NodePath,
        src: String,
        alt: String,
        controls: Vec<Control>,
    },
}

/// Render the whole document
pub fn render(doc: &Document) -> Vec<View> {
    doc.nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| render_node(node, vec![idx]))
        .collect()
}

/// Render one node found at `path`
pub fn render_node(node: &Node, path: NodePath) -> View {
    match node {
        Node::Paragraph { content } => View::Text {
            tag: "p".to_string(),
            path,
            html: inline_html(content),
        },
        Node::Heading { level, content } => View::Text {
            tag: format!("h{}", level),
            path,
            html: inline_html(content),
        },
        Node::CodeBlock { text } => View::Text {
            tag: "pre".to_string(),
            path,
            html: text_html(text),
        },
        Node::HorizontalRule => View::Rule { path },
        Node::Image(attrs) => View::Image {
            path,
            src: attrs.src.clone(),
            alt: attrs.alt.clone(),
            controls: IMAGE_CONTROLS.to_vec(),
        },
        Node::Blockquote { children }
        | Node::BulletList { children }
        | Node::OrderedList { children }
        | Node::ListItem { children } => {
            let tag = match node {
                Node::Blockquote { .. } => "blockquote",
                Node::BulletList { .. } => "ul",
                Node::OrderedList { .. } => "ol",
                _ => "li",
            };
            let children = children
                .iter()
                .enumerate()
                .map(|(idx, child)| {
                    let mut child_path = path.clone();
                    child_path.push(idx);
                    render_node(child, child_path)
                })
                .collect();
            View::Block {
                tag: tag.to_string(),
                path,
                children,
            }
        }
    }
}
