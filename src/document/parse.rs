//! HTML to Document
//!
//! html5ever parses the fragment with full error recovery; this module maps
//! the resulting DOM onto document nodes. Parsing never fails:
//! - unknown tags are transparent
//! - loose inline content gets an implicit paragraph
//! - containers nested past [`MAX_DEPTH`] are flattened into their parent
//!
//! The DOM is walked with an explicit stack, so input depth is not bounded
//! by the call stack.

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, Attribute, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::document::node::{Document, ImageAttrs, Inline, Marks, Node, TextRun, MAX_DEPTH};

/// Block-level wrappers that are skipped but keep their content
const TRANSPARENT_BLOCKS: &[&str] = &[
    "html", "head", "body", "div", "section", "article", "main", "header", "footer", "figure",
    "figcaption", "nav", "aside",
];

/// Elements dropped together with their content
const SKIPPED: &[&str] = &["script", "style", "template", "noscript", "title"];

/// Parse an HTML fragment into a document
pub fn parse_html(html: &str) -> Document {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("body")),
        Vec::new(),
    )
    .one(html);

    let mut builder = TreeBuilder::default();
    builder.walk(&dom.document);
    builder.finish()
}

enum Visit {
    Enter(Handle),
    Leave,
}

/// What entering an element did, undone when leaving it
enum Action {
    Inline,
    /// Block wrapper or flattened container: closes text on both edges
    Wrapper,
    Container,
    TextBlock,
    /// Marks in effect before the element
    Mark(Marks),
    Pre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
}

struct OpenContainer {
    kind: ContainerKind,
    /// Tree levels this container accounts for
    weight: usize,
    children: Vec<Node>,
}

enum TextKind {
    Paragraph,
    Heading(u8),
    /// Inline content found outside a paragraph
    Implicit,
}

struct TextBlock {
    kind: TextKind,
    content: Vec<Inline>,
}

impl TextBlock {
    fn new(kind: TextKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
        }
    }

    fn implicit() -> Self {
        Self::new(TextKind::Implicit)
    }
}

#[derive(Default)]
struct TreeBuilder {
    blocks: Vec<Node>,
    /// Open containers, innermost last
    open: Vec<OpenContainer>,
    text: Option<TextBlock>,
    marks: Marks,
    /// Text collected inside `<pre>`
    pre: Option<String>,
    actions: Vec<Action>,
}

impl TreeBuilder {
    fn walk(&mut self, root: &Handle) {
        let mut stack = vec![Visit::Enter(root.clone())];

        while let Some(visit) = stack.pop() {
            let handle = match visit {
                Visit::Enter(handle) => handle,
                Visit::Leave => {
                    self.leave();
                    continue;
                }
            };

            let action = match &handle.data {
                NodeData::Document => Some(Action::Inline),
                NodeData::Text { contents } => {
                    self.push_text(&contents.borrow());
                    None
                }
                NodeData::Element { name, attrs, .. } => self.enter(&name.local, &attrs.borrow()),
                _ => None,
            };

            if let Some(action) = action {
                self.actions.push(action);
                stack.push(Visit::Leave);
                let children = handle.children.borrow();
                stack.extend(children.iter().rev().cloned().map(Visit::Enter));
            }
        }
    }

    fn finish(mut self) -> Document {
        self.close_text();
        Document::new(self.blocks)
    }

    /// Levels used by the open containers
    fn depth(&self) -> usize {
        self.open.iter().map(|c| c.weight).sum()
    }

    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(container) => &mut container.children,
            None => &mut self.blocks,
        }
    }

    fn push_block(&mut self, node: Node) {
        self.close_text();
        self.children_mut().push(node);
    }

    fn close_text(&mut self) {
        let Some(TextBlock { kind, mut content }) = self.text.take() else {
            return;
        };
        let node = match kind {
            TextKind::Paragraph => Node::Paragraph { content },
            TextKind::Heading(level) => Node::Heading { level, content },
            TextKind::Implicit => {
                if is_blank(&content) {
                    return;
                }
                trim_edges(&mut content);
                Node::Paragraph { content }
            }
        };
        self.children_mut().push(node);
    }

    fn open_text(&mut self, kind: TextKind) {
        self.close_text();
        self.text = Some(TextBlock::new(kind));
    }

    fn push_text(&mut self, text: &str) {
        if let Some(pre) = self.pre.as_mut() {
            pre.push_str(text);
            return;
        }
        if self.text.is_none() && text.trim().is_empty() {
            return;
        }
        let block = self.text.get_or_insert_with(TextBlock::implicit);
        push_run(&mut block.content, text, &self.marks);
    }

    fn enter(&mut self, name: &str, attrs: &[Attribute]) -> Option<Action> {
        if self.pre.is_some() {
            return Some(Action::Inline);
        }
        if SKIPPED.contains(&name) {
            return None;
        }
        if let Some(level) = heading_level(name) {
            self.open_text(TextKind::Heading(level));
            return Some(Action::TextBlock);
        }

        match name {
            "p" => {
                self.open_text(TextKind::Paragraph);
                Some(Action::TextBlock)
            }
            "blockquote" | "ul" | "ol" | "li" => Some(self.open_container(name)),
            "pre" => {
                self.close_text();
                self.pre = Some(String::new());
                Some(Action::Pre)
            }
            "hr" => {
                self.push_block(Node::HorizontalRule);
                None
            }
            "img" => {
                self.push_block(Node::Image(ImageAttrs {
                    src: attr(attrs, "src"),
                    alt: attr(attrs, "alt"),
                }));
                None
            }
            "br" => {
                let block = self.text.get_or_insert_with(TextBlock::implicit);
                block.content.push(Inline::HardBreak);
                None
            }
            _ if TRANSPARENT_BLOCKS.contains(&name) => {
                self.close_text();
                Some(Action::Wrapper)
            }
            _ => {
                let mut next = self.marks.clone();
                if apply_mark(name, attrs, &mut next) {
                    Some(Action::Mark(std::mem::replace(&mut self.marks, next)))
                } else {
                    Some(Action::Inline)
                }
            }
        }
    }

    fn open_container(&mut self, name: &str) -> Action {
        let in_list = matches!(
            self.open.last().map(|c| c.kind),
            Some(ContainerKind::BulletList | ContainerKind::OrderedList)
        );
        // Lists count twice: loose children get wrapped in an item
        let (kind, weight) = match name {
            "blockquote" => (ContainerKind::Blockquote, 1),
            "ul" => (ContainerKind::BulletList, 2),
            "ol" => (ContainerKind::OrderedList, 2),
            _ if in_list => (ContainerKind::ListItem, 0),
            _ => (ContainerKind::ListItem, 1),
        };

        self.close_text();
        // Leave room for a leaf inside the container
        if self.depth() + weight + 1 > MAX_DEPTH {
            return Action::Wrapper;
        }
        self.open.push(OpenContainer {
            kind,
            weight,
            children: Vec::new(),
        });
        Action::Container
    }

    fn leave(&mut self) {
        match self.actions.pop() {
            Some(Action::Container) => {
                self.close_text();
                if let Some(container) = self.open.pop() {
                    let node = container_node(container.kind, container.children);
                    self.children_mut().push(node);
                }
            }
            Some(Action::Wrapper) | Some(Action::TextBlock) => self.close_text(),
            Some(Action::Mark(previous)) => self.marks = previous,
            Some(Action::Pre) => {
                if let Some(text) = self.pre.take() {
                    self.push_block(Node::CodeBlock { text });
                }
            }
            Some(Action::Inline) | None => {}
        }
    }
}

fn attr(attrs: &[Attribute], key: &str) -> String {
    attrs
        .iter()
        .find(|a| &*a.name.local == key)
        .map(|a| a.value.to_string())
        .unwrap_or_default()
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn container_node(kind: ContainerKind, children: Vec<Node>) -> Node {
    match kind {
        ContainerKind::Blockquote => Node::Blockquote { children },
        ContainerKind::BulletList => Node::BulletList {
            children: into_list_items(children),
        },
        ContainerKind::OrderedList => Node::OrderedList {
            children: into_list_items(children),
        },
        ContainerKind::ListItem => Node::ListItem { children },
    }
}

/// Lists only hold list items; wrap anything else
fn into_list_items(children: Vec<Node>) -> Vec<Node> {
    children
        .into_iter()
        .map(|child| match child {
            item @ Node::ListItem { .. } => item,
            other => Node::ListItem {
                children: vec![other],
            },
        })
        .collect()
}

/// Update `marks` for an inline formatting tag; false if the tag carries no mark
fn apply_mark(name: &str, attrs: &[Attribute], marks: &mut Marks) -> bool {
    match name {
        "strong" | "b" => marks.bold = true,
        "em" | "i" => marks.italic = true,
        "u" => marks.underline = true,
        "s" | "strike" | "del" => marks.strike = true,
        "code" => marks.code = true,
        "a" => {
            marks.link = attrs
                .iter()
                .find(|a| &*a.name.local == "href")
                .map(|a| a.value.to_string());
        }
        _ => return false,
    }
    true
}

fn push_run(content: &mut Vec<Inline>, text: &str, marks: &Marks) {
    if let Some(Inline::Text(prev)) = content.last_mut() {
        if prev.marks == *marks {
            prev.text.push_str(text);
            return;
        }
    }
    content.push(Inline::Text(TextRun {
        text: text.to_string(),
        marks: marks.clone(),
    }));
}

/// Strip formatting whitespace around loose inline content
fn trim_edges(content: &mut Vec<Inline>) {
    if let Some(Inline::Text(first)) = content.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(Inline::Text(last)) = content.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    content.retain(|inline| !matches!(inline, Inline::Text(run) if run.text.is_empty()));
}

fn is_blank(content: &[Inline]) -> bool {
    content.iter().all(|inline| match inline {
        Inline::Text(run) => run.text.trim().is_empty(),
        Inline::HardBreak => true,
    })
}
