//! # mdlatex
//!
//! A fast, lightweight library for converting Markdown documents to LaTeX.
//!
//! ## Features
//!
//! - CommonMark input via the `markdown` crate
//! - Headings map to `\section` … `\subparagraph`, with level offset and
//!   optional unnumbered (starred) commands
//! - Fenced code renders through `listings`, with the language option set
//!   when `listings` knows the language
//! - Output is safe to compile: reserved characters are escaped, verbatim
//!   lines that could close the document are commented out, and dangerous
//!   link destinations are dropped unless unsafe mode is enabled
//! - Optional `\DeclareUnicodeCharacter` generation for non-ASCII input
//!
//! ## Quick Start
//!
//! ```
//! use mdlatex::{RenderConfig, markdown_to_latex};
//!
//! let tex = markdown_to_latex("# Title\n\nHello *world*.", &RenderConfig::default()).unwrap();
//! assert!(tex.contains("\\section{Title}"));
//! assert!(tex.contains("Hello \\textit{world}."));
//! ```
//!
//! ## Working with Trees
//!
//! The renderer consumes an [`ast::Tree`] whose text attributes are byte
//! spans into the source. Trees can come from [`parse`] or be built by hand:
//!
//! ```
//! use mdlatex::ast::{NodeId, NodeKind, Span, Tree};
//! use mdlatex::latex::LatexRenderer;
//!
//! let source = b"Chapter One";
//! let mut tree = Tree::new();
//! let heading = tree.push(NodeId::ROOT, NodeKind::Heading { level: 1 });
//! tree.push(heading, NodeKind::text(Span::new(0, 11)));
//!
//! let tex = LatexRenderer::new().render_to_vec(&tree, source).unwrap();
//! assert!(String::from_utf8(tex).unwrap().contains("\\section{Chapter One}"));
//! ```

pub mod ast;
pub mod error;
pub mod latex;
mod parse;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Error, Result};
pub use latex::{LatexRenderer, RenderConfig};
pub use parse::parse;

/// Parse `input` as CommonMark and render it to a complete LaTeX document.
///
/// Fails with [`Error::Utf8`] when a custom preamble is not valid UTF-8.
/// Render with [`LatexRenderer::render_to_vec`] to keep such bytes as is.
pub fn markdown_to_latex(input: &str, config: &RenderConfig) -> Result<String> {
    let tree = parse(input)?;
    let out = LatexRenderer::with_config(config.clone()).render_to_vec(&tree, input.as_bytes())?;
    Ok(String::from_utf8(out)?)
}

/// Render `input` as HTML instead, using the `markdown` crate's renderer.
///
/// Raw HTML in the input is escaped, as in CommonMark's safe mode.
pub fn markdown_to_html(input: &str) -> String {
    markdown::to_html(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_latex_end_to_end() {
        let config = RenderConfig::new().with_preamble(b"%p\n".to_vec());
        let tex = markdown_to_latex("# Title\n\nHello *world*.", &config).unwrap();
        assert_eq!(
            tex,
            "%p\n\n\\begin{document}\n\n\\section{Title}\nHello \\textit{world}.\\\\\n\n\n\\end{document}\n"
        );
    }

    #[test]
    fn test_non_utf8_preamble_is_utf8_error() {
        let config = RenderConfig::new().with_preamble(b"% caf\xe9\n".to_vec());
        let err = markdown_to_latex("hi", &config).unwrap_err();
        assert!(matches!(err, Error::Utf8(_)));
    }

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html("*hi*");
        assert_eq!(html, "<p><em>hi</em></p>");
    }
}
