//! Document tree → LaTeX rendering.
//!
//! This module turns a parsed [`Tree`](crate::ast::Tree) into the source of
//! a LaTeX document. It is pure: output goes to any [`std::io::Write`]
//! sink supplied by the caller.
//!
//! - [`escape`]: Byte scanner replacing the ten LaTeX reserved characters
//! - [`safety`]: Neutralising of `\end` lines in verbatim content and of
//!   dangerous link destinations
//! - [`heading`]: Heading level offset, clamping and command selection
//! - [`lang`]: `listings` language whitelist for fenced code
//! - [`unicode`]: `\DeclareUnicodeCharacter` collection
//! - [`render`]: Node handlers and the depth-first traversal
//!
//! ## Design Notes
//!
//! - **Exhaustive dispatch**: every node kind has exactly one handler,
//!   selected by a `match` over [`NodeKind`](crate::ast::NodeKind)
//! - **Unsupported constructs degrade**: HTML blocks, raw HTML and images
//!   become a LaTeX comment and their children are skipped
//! - **Safe by default**: verbatim lines containing `\end` are commented out
//!   and `javascript:`-style link destinations dropped unless
//!   [`RenderConfig::unsafe_mode`] is set

mod config;
mod escape;
mod heading;
mod lang;
mod render;
mod safety;
mod unicode;

pub use config::{DEFAULT_PREAMBLE, DeclareUnicodeFn, RenderConfig, default_preamble};
pub use escape::{escape_latex, write_escaped};
pub use heading::{MAX_HEADING_LEVEL, effective_heading_level, heading_start};
pub use lang::{MAX_LANGUAGE_LEN, supported_language};
pub use render::{LatexRenderer, WalkStatus, render};
pub use safety::{contains_terminator, is_dangerous_url};
pub use unicode::{DeclaredUnicode, declare_common_symbol};
