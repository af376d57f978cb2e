//! Document tree node types and kinds.

/// Unique identifier for a node within a [`Tree`](super::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always the Document).
    pub const ROOT: NodeId = NodeId(0);
}

/// Byte range into the raw source buffer.
///
/// Spans are byte offsets, not character offsets: slicing must respect the
/// byte boundaries produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset into the source.
    pub start: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// Create a span from a `start..end` pair of byte offsets.
    ///
    /// Offsets are `u32`, so sources are limited to 4 GiB. Offsets past the
    /// limit saturate to `u32::MAX`; [`parse`](crate::parse) rejects larger
    /// inputs up front.
    pub fn from_range(start: usize, end: usize) -> Self {
        let start = u32::try_from(start).unwrap_or(u32::MAX);
        let end = u32::try_from(end).unwrap_or(u32::MAX);
        Self {
            start,
            len: end.saturating_sub(start),
        }
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the end offset.
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.len)
    }

    /// Resolve the span against the source it was taken from.
    ///
    /// Out-of-range spans resolve to the empty slice.
    pub fn value<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        source
            .get(self.start as usize..self.end() as usize)
            .unwrap_or_default()
    }
}

/// Kind of an autolink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoLinkType {
    /// `<https://example.com>`
    #[default]
    Url,
    /// `<user@example.com>`
    Email,
}

/// Kind-specific payload of a node.
///
/// The set of kinds is closed: the renderer dispatches on this enum with an
/// exhaustive `match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root node. Exactly one per tree.
    Document,
    /// ATX or setext heading, level is 1-based.
    Heading { level: u8 },
    /// Block quote (`> ...`).
    Blockquote,
    /// Indented code block. Content lines reference the source.
    CodeBlock { lines: Vec<Span> },
    /// Fenced code block with an optional info-string language tag.
    FencedCodeBlock {
        language: Option<Span>,
        lines: Vec<Span>,
    },
    /// Raw HTML block.
    HtmlBlock,
    /// Ordered or bullet list. Children are always list items.
    List { ordered: bool },
    /// A single list item.
    ListItem,
    /// Paragraph of inline content.
    Paragraph,
    /// Inline content of a tight list item (a paragraph without spacing).
    TextBlock,
    /// Horizontal rule.
    ThematicBreak,
    /// `<...>` autolink.
    AutoLink {
        url: Span,
        label: Span,
        link_type: AutoLinkType,
    },
    /// Inline code. Children are leaf text nodes.
    CodeSpan,
    /// Emphasis: level 1 italic, 2 bold, 3 alternate emphasis.
    Emphasis { level: u8 },
    /// Image. Rendering is unsupported, the destination is kept for callers.
    Image { destination: Vec<u8> },
    /// Inline link with an already unescaped destination.
    Link { destination: Vec<u8> },
    /// Raw inline HTML.
    RawInline,
    /// Leaf text referencing the source.
    Text {
        segment: Span,
        raw: bool,
        hard_line_break: bool,
        soft_line_break: bool,
    },
    /// Leaf text with an owned value that does not exist verbatim in the source.
    StringLiteral { value: Vec<u8>, code: bool, raw: bool },
}

impl NodeKind {
    /// Plain (escaped, unbroken) text node over `segment`.
    pub fn text(segment: Span) -> Self {
        NodeKind::Text {
            segment,
            raw: false,
            hard_line_break: false,
            soft_line_break: false,
        }
    }

    /// Plain string literal node.
    pub fn string(value: impl Into<Vec<u8>>) -> Self {
        NodeKind::StringLiteral {
            value: value.into(),
            code: false,
            raw: false,
        }
    }

    /// Short name of the kind, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Heading { .. } => "Heading",
            NodeKind::Blockquote => "Blockquote",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::FencedCodeBlock { .. } => "FencedCodeBlock",
            NodeKind::HtmlBlock => "HTMLBlock",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem => "ListItem",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::TextBlock => "TextBlock",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::AutoLink { .. } => "AutoLink",
            NodeKind::CodeSpan => "CodeSpan",
            NodeKind::Emphasis { .. } => "Emphasis",
            NodeKind::Image { .. } => "Image",
            NodeKind::Link { .. } => "Link",
            NodeKind::RawInline => "RawInline",
            NodeKind::Text { .. } => "Text",
            NodeKind::StringLiteral { .. } => "String",
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Kind and kind-specific attributes.
    pub kind: NodeKind,
    /// Parent node (None for the root).
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node.
    pub last_child: Option<NodeId>,
    /// Next sibling node.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling node.
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    /// Create a detached node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}
