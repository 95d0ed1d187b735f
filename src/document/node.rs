//! Document Tree
//!
//! Typed block and inline nodes for article content. Pure data plus
//! path-based lookup; editing lives in `transaction`.

use serde::{Deserialize, Serialize};

/// Sequence of child indices from the document root to a node
pub type NodePath = Vec<usize>;

/// Deepest block nesting a document may hold. Parsed input nested deeper
/// is flattened; transactions that would exceed it are rejected.
pub const MAX_DEPTH: usize = 64;

/// An editor document: an ordered list of block nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
}

/// A block-level node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Paragraph { content: Vec<Inline> },
    Heading { level: u8, content: Vec<Inline> },
    Blockquote { children: Vec<Node> },
    BulletList { children: Vec<Node> },
    OrderedList { children: Vec<Node> },
    ListItem { children: Vec<Node> },
    CodeBlock { text: String },
    HorizontalRule,
    Image(ImageAttrs),
}

/// Attributes of an image node. The `src` is its only identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Inline content of paragraphs and headings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text(TextRun),
    HardBreak,
}

/// A run of text sharing the same marks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

/// Formatting marks applied to a text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
    pub link: Option<String>,
}

impl Inline {
    /// Plain text run without marks
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun {
            text: text.into(),
            marks: Marks::default(),
        })
    }
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Paragraph {
            content: vec![Inline::text(text)],
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Node::Heading {
            level: level.clamp(1, 6),
            content: vec![Inline::text(text)],
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Node::Image(ImageAttrs {
            src: src.into(),
            alt: alt.into(),
        })
    }

    /// Name of the node kind, as used in error messages and views
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::Blockquote { .. } => "blockquote",
            Node::BulletList { .. } => "bullet_list",
            Node::OrderedList { .. } => "ordered_list",
            Node::ListItem { .. } => "list_item",
            Node::CodeBlock { .. } => "code_block",
            Node::HorizontalRule => "horizontal_rule",
            Node::Image(_) => "image",
        }
    }

    /// Child nodes of a container node
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Blockquote { children }
            | Node::BulletList { children }
            | Node::OrderedList { children }
            | Node::ListItem { children } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Blockquote { children }
            | Node::BulletList { children }
            | Node::OrderedList { children }
            | Node::ListItem { children } => Some(children),
            _ => None,
        }
    }

    pub fn image_attrs(&self) -> Option<&ImageAttrs> {
        match self {
            Node::Image(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Levels of block nesting, counting this node as one
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(children) = node.children() {
                stack.extend(children.iter().map(|child| (child, depth + 1)));
            }
        }
        deepest
    }

    /// Concatenated text of this node and its descendants
    pub fn plain_text(&self) -> String {
        match self {
            Node::Paragraph { content } | Node::Heading { content, .. } => content
                .iter()
                .map(|inline| match inline {
                    Inline::Text(run) => run.text.as_str(),
                    Inline::HardBreak => "\n",
                })
                .collect(),
            Node::CodeBlock { text } => text.clone(),
            Node::HorizontalRule | Node::Image(_) => String::new(),
            _ => self
                .children()
                .map(|children| {
                    children
                        .iter()
                        .map(Node::plain_text)
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_default(),
        }
    }
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Node at the given path, if any
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.nodes.get(first)?;
        for &idx in rest {
            node = node.children()?.get(idx)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.nodes.get_mut(first)?;
        for &idx in rest {
            node = node.children_mut()?.get_mut(idx)?;
        }
        Some(node)
    }

    /// Child list addressed by a parent path (the empty path is the root)
    pub fn children_at(&self, parent: &[usize]) -> Option<&Vec<Node>> {
        if parent.is_empty() {
            Some(&self.nodes)
        } else {
            self.get(parent)?.children()
        }
    }

    pub fn children_at_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            Some(&mut self.nodes)
        } else {
            self.get_mut(parent)?.children_mut()
        }
    }

    /// All image nodes in document order, with their paths
    pub fn images(&self) -> Vec<(NodePath, &ImageAttrs)> {
        let mut found = Vec::new();
        let mut stack: Vec<(NodePath, &Node)> = self
            .nodes
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, node)| (vec![idx], node))
            .collect();
        while let Some((path, node)) = stack.pop() {
            match node {
                Node::Image(attrs) => found.push((path, attrs)),
                other => {
                    if let Some(children) = other.children() {
                        for (idx, child) in children.iter().enumerate().rev() {
                            let mut child_path = path.clone();
                            child_path.push(idx);
                            stack.push((child_path, child));
                        }
                    }
                }
            }
        }
        found
    }

    /// Image sources in document order (duplicates kept)
    pub fn image_srcs(&self) -> Vec<&str> {
        self.images()
            .into_iter()
            .map(|(_, attrs)| attrs.src.as_str())
            .collect()
    }

    /// Whether any image anywhere in the tree uses `src`
    pub fn contains_image_src(&self, src: &str) -> bool {
        let mut stack: Vec<&Node> = self.nodes.iter().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Image(attrs) if attrs.src == src => return true,
                other => {
                    if let Some(children) = other.children() {
                        stack.extend(children);
                    }
                }
            }
        }
        false
    }
}
