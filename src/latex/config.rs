//! Renderer configuration.

use std::fmt;
use std::sync::Arc;

/// Built-in preamble written before `\begin{document}`.
///
/// Does not include `\begin{document}` itself.
pub const DEFAULT_PREAMBLE: &[u8] = include_bytes!("preamble.tex");

/// Returns an owned copy of the built-in preamble, suitable as a starting
/// point for [`RenderConfig::with_preamble`].
pub fn default_preamble() -> Vec<u8> {
    DEFAULT_PREAMBLE.to_vec()
}

/// Strategy mapping a non-ASCII character to its LaTeX replacement.
///
/// Returning `None` leaves the character undeclared.
pub type DeclareUnicodeFn = Arc<dyn Fn(char) -> Option<String> + Send + Sync>;

/// Configuration for LaTeX rendering.
#[derive(Clone, Default)]
pub struct RenderConfig {
    /// Added to every heading level before clamping. If the offset is 1,
    /// `\section` becomes `\subsection` and so on. May be negative.
    pub heading_offset: i32,
    /// Use the starred (unnumbered) sectioning commands.
    pub no_numbering: bool,
    /// Replaces the default preamble. Must not end with `\begin{document}`,
    /// which is added automatically.
    pub preamble: Option<Vec<u8>>,
    /// Render possibly unsafe content: dangerous link destinations and
    /// verbatim lines that could close the document.
    pub unsafe_mode: bool,
    /// Declare every non-ASCII source character this strategy handles.
    pub declare_unicode: Option<DeclareUnicodeFn>,
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("heading_offset", &self.heading_offset)
            .field("no_numbering", &self.no_numbering)
            .field("preamble", &self.preamble.as_ref().map(Vec::len))
            .field("unsafe_mode", &self.unsafe_mode)
            .field("declare_unicode", &self.declare_unicode.is_some())
            .finish()
    }
}

impl RenderConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading level offset.
    pub fn with_heading_offset(mut self, offset: i32) -> Self {
        self.heading_offset = offset;
        self
    }

    /// Enable or disable heading numbering.
    pub fn with_numbering(mut self, numbered: bool) -> Self {
        self.no_numbering = !numbered;
        self
    }

    /// Replace the default preamble.
    pub fn with_preamble(mut self, preamble: impl Into<Vec<u8>>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Allow possibly unsafe content.
    pub fn with_unsafe(mut self, unsafe_mode: bool) -> Self {
        self.unsafe_mode = unsafe_mode;
        self
    }

    /// Declare non-ASCII characters through `declare`.
    pub fn with_declare_unicode<F>(mut self, declare: F) -> Self
    where
        F: Fn(char) -> Option<String> + Send + Sync + 'static,
    {
        self.declare_unicode = Some(Arc::new(declare));
        self
    }

    /// The preamble to write: the custom one if set, else the built-in.
    pub fn preamble(&self) -> &[u8] {
        self.preamble.as_deref().unwrap_or(DEFAULT_PREAMBLE)
    }
}
