//! Core document tree → LaTeX rendering.
//!
//! One handler per node kind, each a function of (sink, source, node,
//! entering) returning a [`WalkStatus`]. The traversal walks the tree depth
//! first and calls the handler on entering and leaving every node. No
//! validation is performed beyond what is needed to avoid panics.

use std::io::Write;

use tracing::{debug, trace};

use crate::ast::{AutoLinkType, NodeId, NodeKind, Span, Tree};
use crate::error::{Error, Result};

use super::config::RenderConfig;
use super::escape::{has_prefix_ignore_case, write_escaped};
use super::heading::{effective_heading_level, heading_start, is_fallback_level};
use super::lang::supported_language;
use super::safety::{is_dangerous_url, write_guarded_line};
use super::unicode::DeclaredUnicode;

const DOCUMENT_BEGIN: &[u8] = b"\n\\begin{document}\n";
const DOCUMENT_END: &[u8] = b"\n\\end{document}\n";
const HARD_BREAK: &[u8] = b"\\\\\n";
const PARAGRAPH_END: &[u8] = b"\\\\\n\n";
const BLOCK_QUOTE_START: &[u8] = b"\n\\begin{framed}\n\\begin{quote}\n";
const BLOCK_QUOTE_END: &[u8] = b"\\end{quote}\n\\end{framed}\n";
const CODE_BLOCK_START: &[u8] = b"\n\\begin{lstlisting}";
const CODE_BLOCK_END: &[u8] = b"\\end{lstlisting}\n";
const HRULE: &[u8] = b"\n\\hrulefill\n";
const ITEM: &[u8] = b"\\item ";
const HREF_START: &[u8] = b"\\href{";
const CODE_SPAN_START: &[u8] = b"\\texttt{";
const MAILTO: &[u8] = b"mailto:";

const HTML_BLOCK_PLACEHOLDER: &[u8] = b"\n% mdlatex: HTML block rendering unsupported, skipped\n";
const IMAGE_PLACEHOLDER: &[u8] = b"\n% mdlatex: image rendering unsupported as of yet\n";
const RAW_HTML_PLACEHOLDER: &[u8] = b"\n% mdlatex: raw HTML rendering unsupported\n";

/// Control signal returned by a node handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    /// Visit the children, then call the handler again on leaving.
    Continue,
    /// Do not descend and do not call the leaving handler: the node has
    /// written everything it needs on entering.
    SkipChildren,
    /// Terminate the whole walk immediately.
    Stop,
}

/// LaTeX renderer for a parsed document tree.
#[derive(Debug, Clone, Default)]
pub struct LatexRenderer {
    config: RenderConfig,
}

impl LatexRenderer {
    /// Create a renderer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with the specified configuration.
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The renderer's configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `tree`, whose spans point into `source`, to `writer`.
    ///
    /// Any handler error aborts the walk. Output written before the error
    /// is left in the writer; callers decide whether to keep it.
    pub fn render<W: Write + ?Sized>(
        &self,
        tree: &Tree,
        source: &[u8],
        writer: &mut W,
    ) -> Result<()> {
        debug!(nodes = tree.node_count(), bytes = source.len(), "rendering document");
        let mut ctx = RenderContext {
            config: &self.config,
            tree,
            source,
            w: writer,
        };
        let root = tree.root();
        match tree.kind(root) {
            Some(NodeKind::Document) => {}
            _ => return Err(Error::malformed(root, "root is not a Document")),
        }
        ctx.walk(root)?;
        Ok(())
    }

    /// Render into a new buffer. On error the partial output is dropped.
    pub fn render_to_vec(&self, tree: &Tree, source: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(source.len() * 2 + self.config.preamble().len());
        self.render(tree, source, &mut out)?;
        Ok(out)
    }
}

/// Render `tree` with `config` into a new buffer.
///
/// # Examples
///
/// ```
/// use mdlatex::ast::{NodeId, NodeKind, Span, Tree};
/// use mdlatex::latex::{RenderConfig, render};
///
/// let source = b"50% done";
/// let mut tree = Tree::new();
/// let para = tree.push(NodeId::ROOT, NodeKind::Paragraph);
/// tree.push(para, NodeKind::text(Span::new(0, 8)));
///
/// let config = RenderConfig::new().with_preamble(b"\\documentclass{article}".to_vec());
/// let out = render(&tree, source, &config).unwrap();
/// let out = String::from_utf8(out).unwrap();
/// assert!(out.contains("50\\% done\\\\"));
/// assert!(out.ends_with("\\end{document}\n"));
/// ```
pub fn render(tree: &Tree, source: &[u8], config: &RenderConfig) -> Result<Vec<u8>> {
    let renderer = LatexRenderer::with_config(config.clone());
    renderer.render_to_vec(tree, source)
}

/// State of one render call.
struct RenderContext<'a, W: Write + ?Sized> {
    config: &'a RenderConfig,
    tree: &'a Tree,
    source: &'a [u8],
    w: &'a mut W,
}

impl<'a, W: Write + ?Sized> RenderContext<'a, W> {
    /// Depth-first walk rooted at `id`.
    fn walk(&mut self, id: NodeId) -> Result<WalkStatus> {
        match self.render_node(id, true)? {
            WalkStatus::Stop => return Ok(WalkStatus::Stop),
            WalkStatus::SkipChildren => return Ok(WalkStatus::Continue),
            WalkStatus::Continue => {}
        }

        let tree = self.tree;
        for child in tree.children(id) {
            if self.walk(child)? == WalkStatus::Stop {
                return Ok(WalkStatus::Stop);
            }
        }

        match self.render_node(id, false)? {
            WalkStatus::Stop => Ok(WalkStatus::Stop),
            _ => Ok(WalkStatus::Continue),
        }
    }

    fn render_node(&mut self, id: NodeId, entering: bool) -> Result<WalkStatus> {
        let tree = self.tree;
        let node = tree
            .node(id)
            .ok_or_else(|| Error::malformed(id, "dangling node id"))?;
        trace!(node = id.0, kind = node.kind.name(), entering, "visit");

        match &node.kind {
            // blocks
            NodeKind::Document => self.render_document(id, entering),
            NodeKind::Heading { level } => self.render_heading(*level, entering),
            NodeKind::Blockquote => self.render_blockquote(entering),
            NodeKind::CodeBlock { lines } => self.render_code_block(None, lines, entering),
            NodeKind::FencedCodeBlock { language, lines } => {
                self.render_code_block(Some(*language), lines, entering)
            }
            NodeKind::HtmlBlock => self.render_unsupported(HTML_BLOCK_PLACEHOLDER, "HTML block"),
            NodeKind::List { ordered } => self.render_list(*ordered, entering),
            NodeKind::ListItem => self.render_list_item(entering),
            NodeKind::Paragraph => self.render_paragraph(id, entering),
            NodeKind::TextBlock => self.render_text_block(id, entering),
            NodeKind::ThematicBreak => self.render_thematic_break(entering),

            // inlines
            NodeKind::AutoLink {
                url,
                label,
                link_type,
            } => self.render_auto_link(*url, *label, *link_type, entering),
            NodeKind::CodeSpan => self.render_code_span(id, entering),
            NodeKind::Emphasis { level } => self.render_emphasis(*level, entering),
            NodeKind::Image { .. } => self.render_unsupported(IMAGE_PLACEHOLDER, "image"),
            NodeKind::Link { destination } => self.render_link(destination, entering),
            NodeKind::RawInline => self.render_unsupported(RAW_HTML_PLACEHOLDER, "raw HTML"),
            NodeKind::Text {
                segment,
                raw,
                hard_line_break,
                soft_line_break,
            } => {
                if entering {
                    self.render_text(*segment, *raw, *hard_line_break, *soft_line_break)?;
                }
                Ok(WalkStatus::Continue)
            }
            NodeKind::StringLiteral { value, code, raw } => {
                if entering {
                    self.render_string(value, *code || *raw)?;
                }
                Ok(WalkStatus::Continue)
            }
        }
    }

    fn render_document(&mut self, id: NodeId, entering: bool) -> Result<WalkStatus> {
        if id != NodeId::ROOT {
            return Err(Error::malformed(id, "Document below the root"));
        }
        if !entering {
            // End of document. Nothing may follow.
            self.w.write_all(DOCUMENT_END)?;
            return Ok(WalkStatus::Stop);
        }

        self.w.write_all(self.config.preamble())?;
        if let Some(declare) = &self.config.declare_unicode {
            self.w.write_all(b"\n")?;
            let mut declared = DeclaredUnicode::new();
            declared.write_declarations(self.w, self.source, |c| declare(c))?;
            debug!(count = declared.declared(), "declared unicode characters");
        }
        self.w.write_all(DOCUMENT_BEGIN)?;
        Ok(WalkStatus::Continue)
    }

    fn render_heading(&mut self, level: u8, entering: bool) -> Result<WalkStatus> {
        if !entering {
            self.w.write_all(b"}\n")?;
            return Ok(WalkStatus::Continue);
        }
        let effective = effective_heading_level(level, self.config.heading_offset);
        let start = heading_start(effective, !self.config.no_numbering);
        self.w.write_all(b"\n")?;
        self.w.write_all(start.as_bytes())?;
        if is_fallback_level(effective) {
            self.w.write_all(b"\n")?;
        }
        Ok(WalkStatus::Continue)
    }

    fn render_blockquote(&mut self, entering: bool) -> Result<WalkStatus> {
        let marker = if entering {
            BLOCK_QUOTE_START
        } else {
            BLOCK_QUOTE_END
        };
        self.w.write_all(marker)?;
        Ok(WalkStatus::Continue)
    }

    /// Indented (`language == None`) and fenced code blocks.
    fn render_code_block(
        &mut self,
        language: Option<Option<Span>>,
        lines: &[Span],
        entering: bool,
    ) -> Result<WalkStatus> {
        if !entering {
            self.w.write_all(CODE_BLOCK_END)?;
            return Ok(WalkStatus::Continue);
        }

        self.w.write_all(CODE_BLOCK_START)?;
        let tag = language.flatten().map(|span| span.value(self.source));
        if let Some(lang) = tag.and_then(supported_language) {
            self.w.write_all(b"[language=")?;
            write_escaped(self.w, lang)?;
            self.w.write_all(b"]")?;
        }
        self.w.write_all(b"\n")?;
        self.write_raw_lines(lines)?;
        Ok(WalkStatus::Continue)
    }

    /// Copy verbatim lines, neutralising the ones that could close the
    /// environment unless unsafe content is allowed.
    fn write_raw_lines(&mut self, lines: &[Span]) -> Result<()> {
        let mut ends_with_newline = true;
        for span in lines {
            let line = span.value(self.source);
            if line.is_empty() {
                continue;
            }
            if write_guarded_line(self.w, line, self.config.unsafe_mode)? {
                let shown = String::from_utf8_lossy(line);
                debug!(line = %shown.trim_end(), "commented out unsafe verbatim line");
                ends_with_newline = true;
            } else {
                ends_with_newline = line.ends_with(b"\n");
            }
        }
        if !ends_with_newline {
            self.w.write_all(b"\n")?;
        }
        Ok(())
    }

    fn render_unsupported(&mut self, placeholder: &[u8], what: &str) -> Result<WalkStatus> {
        debug!(construct = what, "skipping unsupported construct");
        self.w.write_all(placeholder)?;
        Ok(WalkStatus::SkipChildren)
    }

    fn render_list(&mut self, ordered: bool, entering: bool) -> Result<WalkStatus> {
        let env = if ordered { "enumerate" } else { "itemize" };
        if entering {
            writeln!(self.w, "\n\\begin{{{env}}}")?;
        } else {
            writeln!(self.w, "\\end{{{env}}}")?;
        }
        Ok(WalkStatus::Continue)
    }

    fn render_list_item(&mut self, entering: bool) -> Result<WalkStatus> {
        if entering {
            self.w.write_all(ITEM)?;
        } else {
            self.w.write_all(b"\n")?;
        }
        Ok(WalkStatus::Continue)
    }

    fn render_paragraph(&mut self, id: NodeId, entering: bool) -> Result<WalkStatus> {
        if entering {
            return Ok(WalkStatus::Continue);
        }
        let in_list = self
            .tree
            .parent(id)
            .and_then(|p| self.tree.kind(p))
            .is_some_and(|k| matches!(k, NodeKind::List { .. } | NodeKind::ListItem));
        if !in_list {
            self.w.write_all(PARAGRAPH_END)?;
        } else if self.tree.next_sibling(id).is_some() {
            // Deliberate extra: the item's closing newline alone would run
            // this paragraph into the next block of a loose item.
            self.w.write_all(b"\n\n")?;
        }
        Ok(WalkStatus::Continue)
    }

    fn render_text_block(&mut self, id: NodeId, entering: bool) -> Result<WalkStatus> {
        if !entering {
            let node = self.tree.node(id);
            let has_next = node.is_some_and(|n| n.next_sibling.is_some());
            let has_content = node.is_some_and(|n| n.has_children());
            if has_next && has_content {
                self.w.write_all(b"\n")?;
            }
        }
        Ok(WalkStatus::Continue)
    }

    fn render_thematic_break(&mut self, entering: bool) -> Result<WalkStatus> {
        if entering {
            self.w.write_all(HRULE)?;
            self.w.write_all(b"\n")?;
        }
        Ok(WalkStatus::Continue)
    }

    fn render_auto_link(
        &mut self,
        url: Span,
        label: Span,
        link_type: AutoLinkType,
        entering: bool,
    ) -> Result<WalkStatus> {
        if !entering {
            return Ok(WalkStatus::Continue);
        }
        let url = url.value(self.source);
        let label = label.value(self.source);
        self.w.write_all(HREF_START)?;
        if link_type == AutoLinkType::Email && !has_prefix_ignore_case(url, MAILTO) {
            self.w.write_all(MAILTO)?;
        }
        write_escaped(self.w, url)?;
        self.w.write_all(b"}{")?;
        write_escaped(self.w, label)?;
        self.w.write_all(b"}")?;
        Ok(WalkStatus::SkipChildren)
    }

    /// Code spans own their subtree: the leaf children are rendered here and
    /// the walk does not descend into them.
    fn render_code_span(&mut self, id: NodeId, entering: bool) -> Result<WalkStatus> {
        if !entering {
            return Ok(WalkStatus::Continue);
        }

        self.w.write_all(CODE_SPAN_START)?;
        let tree = self.tree;
        for child in tree.children(id) {
            let value = match tree.kind(child) {
                Some(NodeKind::Text { segment, .. }) => segment.value(self.source),
                Some(NodeKind::StringLiteral { value, .. }) => value.as_slice(),
                _ => return Err(Error::malformed(child, "code span child is not text")),
            };
            match value.strip_suffix(b"\n") {
                Some(line) => {
                    write_escaped(self.w, line)?;
                    self.w.write_all(b" ")?;
                }
                None => write_escaped(self.w, value)?,
            }
        }
        self.w.write_all(b"}")?;
        Ok(WalkStatus::SkipChildren)
    }

    fn render_emphasis(&mut self, level: u8, entering: bool) -> Result<WalkStatus> {
        if !entering {
            self.w.write_all(b"}")?;
            return Ok(WalkStatus::Continue);
        }
        let tag: &[u8] = match level {
            2 => b"\\textbf{",
            3 => b"\\emph{",
            _ => b"\\textit{",
        };
        self.w.write_all(tag)?;
        Ok(WalkStatus::Continue)
    }

    fn render_link(&mut self, destination: &[u8], entering: bool) -> Result<WalkStatus> {
        if !entering {
            self.w.write_all(b"}")?;
            return Ok(WalkStatus::Continue);
        }
        self.w.write_all(HREF_START)?;
        if self.config.unsafe_mode || !is_dangerous_url(destination) {
            write_escaped(self.w, destination)?;
        } else {
            let shown = String::from_utf8_lossy(destination);
            debug!(destination = %shown, "dropped dangerous link destination");
        }
        self.w.write_all(b"}{")?;
        Ok(WalkStatus::Continue)
    }

    fn render_text(
        &mut self,
        segment: Span,
        raw: bool,
        hard_line_break: bool,
        soft_line_break: bool,
    ) -> Result<()> {
        let text = segment.value(self.source);
        if raw {
            self.w.write_all(text)?;
            return Ok(());
        }
        write_escaped(self.w, text)?;
        if hard_line_break {
            self.w.write_all(HARD_BREAK)?;
        } else if soft_line_break {
            self.w.write_all(b"\n")?;
        }
        Ok(())
    }

    fn render_string(&mut self, value: &[u8], verbatim: bool) -> Result<()> {
        if verbatim {
            self.w.write_all(value)?;
        } else {
            write_escaped(self.w, value)?;
        }
        Ok(())
    }
}
