//! Error types for views.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::NodeId;

/// Result type alias for template hooks.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type alias for document operations.
pub type DomResult<T> = Result<T, DomError>;

/// Errors raised while producing markup from resolved data.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Missing field in template data: {0}")]
    MissingField(String),

    #[error("Template failed: {0}")]
    Failed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`Document`](crate::document::Document).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Invalid selector '{selectors}': {message}")]
    InvalidSelector { selectors: String, message: String },

    #[error("Node {0} is no longer attached to the document")]
    StaleNode(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
}

/// Errors raised by the built-in data sources in [`request`](crate::request).
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a [`View::render`](crate::view::View::render) call.
///
/// `E` is the error type of the request that was awaited. An upstream
/// failure is carried as-is, so its message and value are exactly the
/// ones the data source produced.
#[derive(Error, Debug)]
pub enum RenderError<E> {
    #[error(transparent)]
    Upstream(E),

    #[error("Template rendering failed: {0}")]
    Template(#[from] TemplateError),

    #[error("Document update failed: {0}")]
    Dom(#[from] DomError),
}

impl<E> RenderError<E> {
    /// Recover the data source's own error, if that is what failed.
    pub fn into_upstream(self) -> Option<E> {
        match self {
            RenderError::Upstream(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, RenderError::Upstream(_))
    }
}
