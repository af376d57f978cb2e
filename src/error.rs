//! Error types for mdlatex operations.

use thiserror::Error;

use crate::ast::NodeId;

/// Errors that can occur while parsing or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Markdown parsing error: {0}")]
    Parse(String),

    #[error("Malformed document tree at node {node:?}: {reason}")]
    MalformedTree { node: NodeId, reason: &'static str },

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    pub(crate) fn malformed(node: NodeId, reason: &'static str) -> Self {
        Error::MalformedTree { node, reason }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
