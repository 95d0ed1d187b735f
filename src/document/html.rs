//! Document to HTML
//!
//! Serialization of the document tree into the HTML fragment stored as
//! article content. Elements are fed to html5ever's serializer, which owns
//! escaping and void-element handling.

use std::io;

use html5ever::serialize::{
    serialize, Serialize, SerializeOpts, Serializer, TraversalScope,
};
use html5ever::{local_name, namespace_url, ns, LocalName, QualName};

use crate::document::node::{Document, ImageAttrs, Inline, Node, TextRun};

/// Serialize a document into an HTML fragment
pub fn to_html(doc: &Document) -> String {
    render(Fragment::Blocks(&doc.nodes))
}

/// Serialize inline content on its own
pub fn inline_html(content: &[Inline]) -> String {
    render(Fragment::Inline(content))
}

/// Escape plain text for use as element content
pub fn text_html(text: &str) -> String {
    render(Fragment::Text(text))
}

enum Fragment<'a> {
    Blocks(&'a [Node]),
    Inline(&'a [Inline]),
    Text(&'a str),
}

impl Serialize for Fragment<'_> {
    fn serialize<S: Serializer>(&self, out: &mut S, _: TraversalScope) -> io::Result<()> {
        match self {
            Fragment::Blocks(nodes) => write_blocks(out, nodes),
            Fragment::Inline(content) => write_inline(out, content),
            Fragment::Text(text) => out.write_text(text),
        }
    }
}

fn render(fragment: Fragment<'_>) -> String {
    let mut buf = Vec::new();
    if let Err(err) = serialize(&mut buf, &fragment, SerializeOpts::default()) {
        log::error!("HTML serialization failed: {}", err);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn html(local: LocalName) -> QualName {
    QualName::new(None, ns!(html), local)
}

fn attr_name(local: LocalName) -> QualName {
    QualName::new(None, ns!(), local)
}

enum Step<'a> {
    Open(&'a Node),
    Close(QualName),
}

fn write_blocks<S: Serializer>(out: &mut S, nodes: &[Node]) -> io::Result<()> {
    let mut stack: Vec<Step> = nodes.iter().rev().map(Step::Open).collect();

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Open(node) => node,
            Step::Close(name) => {
                out.end_elem(name)?;
                continue;
            }
        };
        match node {
            Node::Paragraph { content } => {
                write_element(out, local_name!("p"), |out| write_inline(out, content))?
            }
            Node::Heading { level, content } => {
                let tag = LocalName::from(format!("h{}", level));
                write_element(out, tag, |out| write_inline(out, content))?
            }
            Node::CodeBlock { text } => write_element(out, local_name!("pre"), |out| {
                write_element(out, local_name!("code"), |out| out.write_text(text))
            })?,
            Node::HorizontalRule => write_element(out, local_name!("hr"), |_| Ok(()))?,
            Node::Image(attrs) => write_image(out, attrs)?,
            Node::Blockquote { children }
            | Node::BulletList { children }
            | Node::OrderedList { children }
            | Node::ListItem { children } => {
                let name = html(container_tag(node));
                out.start_elem(name.clone(), std::iter::empty())?;
                stack.push(Step::Close(name));
                stack.extend(children.iter().rev().map(Step::Open));
            }
        }
    }
    Ok(())
}

fn container_tag(node: &Node) -> LocalName {
    match node {
        Node::BulletList { .. } => local_name!("ul"),
        Node::OrderedList { .. } => local_name!("ol"),
        Node::ListItem { .. } => local_name!("li"),
        _ => local_name!("blockquote"),
    }
}

fn write_element<S, F>(out: &mut S, local: LocalName, body: F) -> io::Result<()>
where
    S: Serializer,
    F: FnOnce(&mut S) -> io::Result<()>,
{
    let name = html(local);
    out.start_elem(name.clone(), std::iter::empty())?;
    body(out)?;
    out.end_elem(name)
}

fn write_image<S: Serializer>(out: &mut S, attrs: &ImageAttrs) -> io::Result<()> {
    let src = attr_name(local_name!("src"));
    let alt = attr_name(local_name!("alt"));
    let name = html(local_name!("img"));
    out.start_elem(
        name.clone(),
        [(&src, attrs.src.as_str()), (&alt, attrs.alt.as_str())].into_iter(),
    )?;
    out.end_elem(name)
}

fn write_inline<S: Serializer>(out: &mut S, content: &[Inline]) -> io::Result<()> {
    for inline in content {
        match inline {
            Inline::Text(run) => write_run(out, run)?,
            Inline::HardBreak => write_element(out, local_name!("br"), |_| Ok(()))?,
        }
    }
    Ok(())
}

fn write_run<S: Serializer>(out: &mut S, run: &TextRun) -> io::Result<()> {
    let marks = &run.marks;
    let mut closers = Vec::new();

    if let Some(href) = &marks.link {
        let name = html(local_name!("a"));
        let href_name = attr_name(local_name!("href"));
        out.start_elem(name.clone(), std::iter::once((&href_name, href.as_str())))?;
        closers.push(name);
    }
    for (on, local) in [
        (marks.bold, local_name!("strong")),
        (marks.italic, local_name!("em")),
        (marks.underline, local_name!("u")),
        (marks.strike, local_name!("s")),
        (marks.code, local_name!("code")),
    ] {
        if on {
            let name = html(local);
            out.start_elem(name.clone(), std::iter::empty())?;
            closers.push(name);
        }
    }

    out.write_text(&run.text)?;

    for name in closers.into_iter().rev() {
        out.end_elem(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::{Marks, MAX_DEPTH};
    use crate::document::parse::parse_html;

    #[test]
    fn test_serialize_blocks() {
        let doc = Document::new(vec![
            Node::heading(2, "Classes"),
            Node::paragraph("intro"),
            Node::image("/media/a.png", "Studio"),
            Node::BulletList {
                children: vec![Node::ListItem {
                    children: vec![Node::paragraph("salsa")],
                }],
            },
            Node::HorizontalRule,
        ]);

        assert_eq!(
            to_html(&doc),
            "<h2>Classes</h2><p>intro</p><img src=\"/media/a.png\" alt=\"Studio\">\
             <ul><li><p>salsa</p></li></ul><hr>"
        );
    }

    #[test]
    fn test_escaping() {
        let doc = Document::new(vec![
            Node::paragraph("Tom & Jerry <3"),
            Node::image("a.png?x=1&y=\"2\"", "it's"),
        ]);
        assert_eq!(
            to_html(&doc),
            "<p>Tom &amp; Jerry &lt;3</p><img src=\"a.png?x=1&amp;y=&quot;2&quot;\" alt=\"it's\">"
        );
        assert_eq!(text_html("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn test_marks_nest_in_fixed_order() {
        let doc = Document::new(vec![Node::Paragraph {
            content: vec![
                Inline::Text(TextRun {
                    text: "go".to_string(),
                    marks: Marks {
                        bold: true,
                        italic: true,
                        link: Some("/classes".to_string()),
                        ..Marks::default()
                    },
                }),
                Inline::HardBreak,
            ],
        }]);
        assert_eq!(
            to_html(&doc),
            "<p><a href=\"/classes\"><strong><em>go</em></strong></a><br></p>"
        );
    }

    #[test]
    fn test_serialized_html_parses_back() {
        let html = "<h1>Title</h1><blockquote><p>quote</p></blockquote>\
                    <ol><li><p>one</p></li></ol><pre><code>a &lt; b</code></pre>\
                    <p><strong>bold</strong> and <s>gone</s></p>";
        let doc = parse_html(html);
        assert_eq!(to_html(&doc), html);
    }

    #[test]
    fn test_serialize_deepest_allowed_document() {
        let mut node = Node::image("deep.png", "");
        for _ in 1..MAX_DEPTH {
            node = Node::Blockquote {
                children: vec![node],
            };
        }
        let doc = Document::new(vec![node]);
        assert_eq!(doc.depth(), MAX_DEPTH);

        let html = to_html(&doc);
        assert!(html.starts_with(&"<blockquote>".repeat(MAX_DEPTH - 1)));
        assert!(html.ends_with(&"</blockquote>".repeat(MAX_DEPTH - 1)));
        assert_eq!(parse_html(&html), doc);
    }
}
