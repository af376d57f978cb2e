//! CommonMark front end: markdown source → [`Tree`].
//!
//! Parsing is delegated to the `markdown` crate. Its mdast is converted into
//! the renderer's tree, keeping byte spans into the input wherever the
//! parsed value exists verbatim in the source. Values that were transformed
//! by the parser (character references, backslash escapes) become
//! `StringLiteral` nodes instead.

use std::collections::HashMap;

use bstr::ByteSlice;
use markdown::mdast::{self, Node as MdNode};
use memchr::memmem;
use tracing::{debug, warn};

use crate::ast::{AutoLinkType, NodeId, NodeKind, Span, Tree};
use crate::error::{Error, Result};

/// Parse CommonMark `input` into a document tree whose spans point into
/// `input.as_bytes()`.
///
/// # Examples
///
/// ```
/// use mdlatex::ast::NodeKind;
/// use mdlatex::parse;
///
/// let tree = parse("# Title").unwrap();
/// let heading = tree.first_child(tree.root()).unwrap();
/// assert_eq!(tree.kind(heading), Some(&NodeKind::Heading { level: 1 }));
/// ```
pub fn parse(input: &str) -> Result<Tree> {
    if u32::try_from(input.len()).is_err() {
        return Err(Error::Parse(format!(
            "input of {} bytes exceeds the 4 GiB span limit",
            input.len()
        )));
    }
    let root = markdown::to_mdast(input, &markdown::ParseOptions::default())
        .map_err(|e| Error::Parse(e.to_string()))?;

    let mut builder = TreeBuilder::new(input.as_bytes());
    builder.collect_definitions(&root);
    if let Some(children) = root.children() {
        builder.convert_flow(children, NodeId::ROOT, false);
    }
    debug!(nodes = builder.tree.node_count(), "parsed markdown");
    Ok(builder.tree)
}

/// Byte range `[start, end)` covered by an mdast node.
fn node_range(node: &MdNode) -> Option<(usize, usize)> {
    node.position().map(|p| (p.start.offset, p.end.offset))
}

struct TreeBuilder<'s> {
    source: &'s [u8],
    tree: Tree,
    /// Link reference definitions by normalized identifier.
    definitions: HashMap<String, String>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s [u8]) -> Self {
        Self {
            source,
            tree: Tree::new(),
            definitions: HashMap::new(),
        }
    }

    fn collect_definitions(&mut self, node: &MdNode) {
        if let MdNode::Definition(def) = node {
            // First definition wins.
            self.definitions
                .entry(def.identifier.clone())
                .or_insert_with(|| def.url.clone());
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    /// Convert block-level children. In tight list items paragraphs become
    /// text blocks.
    fn convert_flow(&mut self, nodes: &[MdNode], parent: NodeId, tight: bool) {
        for node in nodes {
            match node {
                MdNode::Paragraph(p) => {
                    let kind = if tight {
                        NodeKind::TextBlock
                    } else {
                        NodeKind::Paragraph
                    };
                    let id = self.tree.push(parent, kind);
                    self.convert_inline(&p.children, id);
                }
                MdNode::Heading(h) => {
                    let id = self.tree.push(parent, NodeKind::Heading { level: h.depth });
                    self.convert_inline(&h.children, id);
                }
                MdNode::Blockquote(bq) => {
                    let id = self.tree.push(parent, NodeKind::Blockquote);
                    self.convert_flow(&bq.children, id, false);
                }
                MdNode::List(list) => self.convert_list(list, parent),
                MdNode::Code(code) => self.convert_code(node, code, parent),
                MdNode::Html(_) => {
                    self.tree.push(parent, NodeKind::HtmlBlock);
                }
                MdNode::ThematicBreak(_) => {
                    self.tree.push(parent, NodeKind::ThematicBreak);
                }
                MdNode::Definition(_) => {}
                other => match other.children() {
                    Some(children) => self.convert_flow(children, parent, tight),
                    None => debug!(node = ?other, "skipping unknown block node"),
                },
            }
        }
    }

    fn convert_list(&mut self, list: &mdast::List, parent: NodeId) {
        let loose = list.spread
            || list
                .children
                .iter()
                .any(|item| matches!(item, MdNode::ListItem(li) if li.spread));
        let id = self.tree.push(
            parent,
            NodeKind::List {
                ordered: list.ordered,
            },
        );
        for child in &list.children {
            match child {
                MdNode::ListItem(item) => {
                    let item_id = self.tree.push(id, NodeKind::ListItem);
                    self.convert_flow(&item.children, item_id, !loose);
                }
                other => debug!(node = ?other, "skipping non-item list child"),
            }
        }
    }

    fn convert_code(&mut self, node: &MdNode, code: &mdast::Code, parent: NodeId) {
        let (start, end) = node_range(node).unwrap_or((0, 0));
        let end = end.min(self.source.len());
        let start = start.min(end);
        let block = &self.source[start..end];

        let fenced = {
            let head = block.trim_start_with(|c| c == ' ' || c == '\t');
            head.starts_with(b"```") || head.starts_with(b"~~~")
        };
        // Content starts after the opening fence line.
        let content_start = if fenced {
            memchr::memchr(b'\n', block).map_or(end, |i| start + i + 1)
        } else {
            start
        };

        // Indented blocks end before their final newline.
        let search_end =
            memchr::memchr(b'\n', &self.source[end..]).map_or(end, |i| end + i + 1);
        let lines = self
            .locate_code_lines(&code.value, content_start, search_end)
            .unwrap_or_else(|| {
                warn!("code block content not found verbatim, copying source lines");
                self.source_lines(content_start, end, fenced)
            });

        let kind = if fenced {
            let first_line_end = memchr::memchr(b'\n', block).map_or(end, |i| start + i);
            let language = code
                .lang
                .as_deref()
                .and_then(|lang| self.find(lang.as_bytes(), start, first_line_end));
            NodeKind::FencedCodeBlock { language, lines }
        } else {
            NodeKind::CodeBlock { lines }
        };
        self.tree.push(parent, kind);
    }

    /// Spans of every line of `value`, newline included, searched in order
    /// within `[from, to)`.
    fn locate_code_lines(&self, value: &str, from: usize, to: usize) -> Option<Vec<Span>> {
        if value.is_empty() {
            return Some(Vec::new());
        }
        let mut cursor = from;
        let mut spans = Vec::new();
        for line in value.as_bytes().split_str("\n") {
            let mut needle = line.to_vec();
            needle.push(b'\n');
            let span = self
                .find(&needle, cursor, to)
                .or_else(|| self.find(line, cursor, to))?;
            cursor = span.end() as usize;
            spans.push(span);
        }
        Some(spans)
    }

    /// Raw source lines in `[from, to)`, dropping a closing fence.
    fn source_lines(&self, from: usize, to: usize, fenced: bool) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut pos = from;
        for line in self.source[from..to].lines_with_terminator() {
            spans.push(Span::from_range(pos, pos + line.len()));
            pos += line.len();
        }
        if fenced
            && let Some(last) = spans.last()
        {
            let text = last.value(self.source).trim_ascii();
            if text.starts_with(b"```") || text.starts_with(b"~~~") {
                spans.pop();
            }
        }
        spans
    }

    fn convert_inline(&mut self, nodes: &[MdNode], parent: NodeId) {
        for node in nodes {
            match node {
                MdNode::Text(text) => self.convert_text(node, &text.value, parent),
                MdNode::Emphasis(em) => {
                    let id = self.tree.push(parent, NodeKind::Emphasis { level: 1 });
                    self.convert_inline(&em.children, id);
                }
                MdNode::Strong(strong) => {
                    let id = self.tree.push(parent, NodeKind::Emphasis { level: 2 });
                    self.convert_inline(&strong.children, id);
                }
                MdNode::InlineCode(code) => {
                    let id = self.tree.push(parent, NodeKind::CodeSpan);
                    let spans = node_range(node)
                        .and_then(|(s, e)| self.code_span_lines(&code.value, s, e));
                    match spans {
                        Some(spans) => {
                            for span in spans {
                                self.tree.push(id, NodeKind::text(span));
                            }
                        }
                        None => {
                            self.tree.push(id, NodeKind::string(code.value.as_bytes()));
                        }
                    }
                }
                MdNode::Break(_) => {
                    let at = node_range(node).map_or(0, |(s, _)| s);
                    self.tree.push(
                        parent,
                        NodeKind::Text {
                            segment: Span::from_range(at, at),
                            raw: false,
                            hard_line_break: true,
                            soft_line_break: false,
                        },
                    );
                }
                MdNode::Link(link) => {
                    if let Some(kind) = self.auto_link(node, link) {
                        self.tree.push(parent, kind);
                    } else {
                        let id = self.tree.push(
                            parent,
                            NodeKind::Link {
                                destination: link.url.as_bytes().to_vec(),
                            },
                        );
                        self.convert_inline(&link.children, id);
                    }
                }
                MdNode::LinkReference(reference) => {
                    let destination = self
                        .definitions
                        .get(&reference.identifier)
                        .map(|url| url.as_bytes().to_vec())
                        .unwrap_or_default();
                    let id = self.tree.push(parent, NodeKind::Link { destination });
                    self.convert_inline(&reference.children, id);
                }
                MdNode::Image(image) => {
                    self.tree.push(
                        parent,
                        NodeKind::Image {
                            destination: image.url.as_bytes().to_vec(),
                        },
                    );
                }
                MdNode::ImageReference(reference) => {
                    let destination = self
                        .definitions
                        .get(&reference.identifier)
                        .map(|url| url.as_bytes().to_vec())
                        .unwrap_or_default();
                    self.tree.push(parent, NodeKind::Image { destination });
                }
                MdNode::Html(_) => {
                    self.tree.push(parent, NodeKind::RawInline);
                }
                other => match other.children() {
                    Some(children) => self.convert_inline(children, parent),
                    None => debug!(node = ?other, "skipping unknown inline node"),
                },
            }
        }
    }

    /// One Text node per line, soft breaks between them. Falls back to a
    /// single string literal when the value is not in the source verbatim.
    fn convert_text(&mut self, node: &MdNode, value: &str, parent: NodeId) {
        let Some((start, end)) = node_range(node) else {
            self.tree.push(parent, NodeKind::string(value.as_bytes()));
            return;
        };

        let mut cursor = start;
        let mut spans = Vec::new();
        for line in value.as_bytes().split_str("\n") {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match self.find(line, cursor, end) {
                Some(span) => {
                    cursor = span.end() as usize;
                    spans.push(span);
                }
                None => {
                    self.tree.push(parent, NodeKind::string(value.as_bytes()));
                    return;
                }
            }
        }

        let last = spans.len().saturating_sub(1);
        for (i, segment) in spans.into_iter().enumerate() {
            self.tree.push(
                parent,
                NodeKind::Text {
                    segment,
                    raw: false,
                    hard_line_break: false,
                    soft_line_break: i < last,
                },
            );
        }
    }

    /// One span per line of a code span, newline included on all but the
    /// last line.
    fn code_span_lines(&self, value: &str, from: usize, to: usize) -> Option<Vec<Span>> {
        let mut cursor = from;
        let mut spans = Vec::new();
        let mut lines = value.as_bytes().split_str("\n").peekable();
        while let Some(line) = lines.next() {
            let span = if lines.peek().is_some() {
                let mut needle = line.to_vec();
                needle.push(b'\n');
                self.find(&needle, cursor, to)?
            } else {
                self.find(line, cursor, to)?
            };
            cursor = span.end() as usize;
            spans.push(span);
        }
        Some(spans)
    }

    /// `<...>` autolinks: the source is the bracketed destination itself.
    fn auto_link(&self, node: &MdNode, link: &mdast::Link) -> Option<NodeKind> {
        let (start, end) = node_range(node)?;
        let raw = self.source.get(start..end)?;
        let inner = raw.strip_prefix(b"<")?.strip_suffix(b">")?;
        let span = Span::from_range(start + 1, end - 1);

        let url = link.url.as_bytes();
        let link_type = if url == inner {
            AutoLinkType::Url
        } else if url.strip_prefix(b"mailto:") == Some(inner) {
            AutoLinkType::Email
        } else {
            return None;
        };
        Some(NodeKind::AutoLink {
            url: span,
            label: span,
            link_type,
        })
    }

    /// First occurrence of `needle` within `[from, to)`.
    fn find(&self, needle: &[u8], from: usize, to: usize) -> Option<Span> {
        let to = to.min(self.source.len());
        if from > to {
            return None;
        }
        let offset = memmem::find(&self.source[from..to], needle)?;
        Some(Span::from_range(from + offset, from + offset + needle.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tree: &Tree) -> Vec<&'static str> {
        tree.iter_dfs()
            .map(|id| tree.kind(id).unwrap().name())
            .collect()
    }

    fn text_of(tree: &Tree, source: &str, id: NodeId) -> String {
        match tree.kind(id).unwrap() {
            NodeKind::Text { segment, .. } => {
                String::from_utf8(segment.value(source.as_bytes()).to_vec()).unwrap()
            }
            NodeKind::StringLiteral { value, .. } => String::from_utf8(value.clone()).unwrap(),
            other => panic!("not a leaf: {other:?}"),
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let source = "# Title\n\nHello *world*.";
        let tree = parse(source).unwrap();
        assert_eq!(
            kinds(&tree),
            vec![
                "Document", "Heading", "Text", "Paragraph", "Text", "Emphasis", "Text", "Text"
            ]
        );
        let para = tree.children(NodeId::ROOT).nth(1).unwrap();
        let texts: Vec<_> = tree.children(para).collect();
        assert_eq!(text_of(&tree, source, texts[0]), "Hello ");
        assert_eq!(text_of(&tree, source, texts[2]), ".");
    }

    #[test]
    fn test_soft_breaks_split_lines() {
        let source = "one\ntwo";
        let tree = parse(source).unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let texts: Vec<_> = tree.children(para).collect();
        assert_eq!(texts.len(), 2);
        assert_eq!(text_of(&tree, source, texts[0]), "one");
        assert_eq!(text_of(&tree, source, texts[1]), "two");
        assert!(matches!(
            tree.kind(texts[0]),
            Some(NodeKind::Text {
                soft_line_break: true,
                ..
            })
        ));
        assert!(matches!(
            tree.kind(texts[1]),
            Some(NodeKind::Text {
                soft_line_break: false,
                ..
            })
        ));
    }

    #[test]
    fn test_hard_break() {
        let tree = parse("a\\\nb").unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let hard = tree.children(para).any(|id| {
            matches!(
                tree.kind(id),
                Some(NodeKind::Text {
                    hard_line_break: true,
                    ..
                })
            )
        });
        assert!(hard);
    }

    #[test]
    fn test_character_reference_becomes_string() {
        let source = "a &amp; b";
        let tree = parse(source).unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let joined: String = tree
            .children(para)
            .map(|id| text_of(&tree, source, id))
            .collect();
        assert_eq!(joined, "a & b");
    }

    #[test]
    fn test_fenced_code_block() {
        let source = "```python\nprint(1)\n\nx = 2\n```\n";
        let tree = parse(source).unwrap();
        let code = tree.first_child(NodeId::ROOT).unwrap();
        match tree.kind(code).unwrap() {
            NodeKind::FencedCodeBlock { language, lines } => {
                assert_eq!(language.unwrap().value(source.as_bytes()), b"python");
                let content: Vec<&[u8]> =
                    lines.iter().map(|l| l.value(source.as_bytes())).collect();
                assert_eq!(content, vec![&b"print(1)\n"[..], b"\n", b"x = 2\n"]);
            }
            other => panic!("expected fenced code, got {other:?}"),
        }
    }

    #[test]
    fn test_indented_code_block() {
        let source = "    let x = 1;\n    let y = 2;\n";
        let tree = parse(source).unwrap();
        let code = tree.first_child(NodeId::ROOT).unwrap();
        match tree.kind(code).unwrap() {
            NodeKind::CodeBlock { lines } => {
                let content: Vec<&[u8]> =
                    lines.iter().map(|l| l.value(source.as_bytes())).collect();
                assert_eq!(content, vec![&b"let x = 1;\n"[..], b"let y = 2;\n"]);
            }
            other => panic!("expected indented code, got {other:?}"),
        }
    }

    #[test]
    fn test_tight_list_uses_text_blocks() {
        let tree = parse("- a\n- b\n").unwrap();
        assert_eq!(
            kinds(&tree),
            vec![
                "Document", "List", "ListItem", "TextBlock", "Text", "ListItem", "TextBlock",
                "Text"
            ]
        );
    }

    #[test]
    fn test_loose_list_uses_paragraphs() {
        let tree = parse("1. a\n\n2. b\n").unwrap();
        let list = tree.first_child(NodeId::ROOT).unwrap();
        assert_eq!(tree.kind(list), Some(&NodeKind::List { ordered: true }));
        let item = tree.first_child(list).unwrap();
        let first = tree.first_child(item).unwrap();
        assert_eq!(tree.kind(first), Some(&NodeKind::Paragraph));
    }

    #[test]
    fn test_autolinks() {
        let source = "<https://example.com> <me@example.com>";
        let tree = parse(source).unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let links: Vec<_> = tree
            .children(para)
            .filter_map(|id| match tree.kind(id) {
                Some(NodeKind::AutoLink { url, link_type, .. }) => Some((
                    String::from_utf8(url.value(source.as_bytes()).to_vec()).unwrap(),
                    *link_type,
                )),
                _ => None,
            })
            .collect();
        assert_eq!(
            links,
            vec![
                ("https://example.com".to_string(), AutoLinkType::Url),
                ("me@example.com".to_string(), AutoLinkType::Email),
            ]
        );
    }

    #[test]
    fn test_reference_link_resolved() {
        let tree = parse("[text][ref]\n\n[ref]: https://example.com\n").unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let link = tree.first_child(para).unwrap();
        assert_eq!(
            tree.kind(link),
            Some(&NodeKind::Link {
                destination: b"https://example.com".to_vec()
            })
        );
    }

    #[test]
    fn test_html_block_and_inline() {
        let tree = parse("<div>\nx\n</div>\n\na <b>b</b>\n").unwrap();
        let names = kinds(&tree);
        assert!(names.contains(&"HTMLBlock"));
        assert!(names.contains(&"RawInline"));
    }

    #[test]
    fn test_multiline_code_span_splits_lines() {
        let source = "`a\nb`";
        let tree = parse(source).unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let code = tree.first_child(para).unwrap();
        assert_eq!(tree.kind(code), Some(&NodeKind::CodeSpan));
        let lines: Vec<_> = tree
            .children(code)
            .map(|id| text_of(&tree, source, id))
            .collect();
        assert_eq!(lines, vec!["a\n", "b"]);
    }

    #[test]
    fn test_source_lines_drop_closing_fence() {
        let source = "```\nx\n  ```  \n";
        let builder = TreeBuilder::new(source.as_bytes());
        let lines = builder.source_lines(4, source.len(), true);
        let content: Vec<&[u8]> = lines.iter().map(|l| l.value(source.as_bytes())).collect();
        assert_eq!(content, vec![&b"x\n"[..]]);

        let lines = builder.source_lines(4, source.len(), false);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_code_span_child() {
        let source = "use `a_b` here";
        let tree = parse(source).unwrap();
        let para = tree.first_child(NodeId::ROOT).unwrap();
        let code = tree.children(para).nth(1).unwrap();
        assert_eq!(tree.kind(code), Some(&NodeKind::CodeSpan));
        let leaf = tree.first_child(code).unwrap();
        assert_eq!(text_of(&tree, source, leaf), "a_b");
    }
}
