//! Query errors

use sgraph_core::{ElementId, Graph, GraphError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid scope '{path}' (resolved up to '{resolved_prefix}')")]
    InvalidScope {
        path: String,
        resolved_prefix: String,
    },

    #[error("invalid element '{path}' (resolved up to '{resolved_prefix}')")]
    InvalidElement {
        path: String,
        resolved_prefix: String,
    },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl QueryError {
    /// The path or pattern the caller supplied.
    pub fn subject(&self) -> &str {
        match self {
            QueryError::InvalidScope { path, .. } | QueryError::InvalidElement { path, .. } => path,
            QueryError::InvalidPattern { pattern, .. } => pattern,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;

fn prefix_of(err: &GraphError) -> String {
    err.resolved_prefix().unwrap_or_default().to_string()
}

/// Resolve the element a query is about.
pub(crate) fn resolve_element(graph: &Graph, path: &str) -> Result<ElementId> {
    graph.resolve(path).map_err(|err| {
        tracing::warn!("Element not found: {}", err);
        QueryError::InvalidElement {
            path: path.to_string(),
            resolved_prefix: prefix_of(&err),
        }
    })
}

/// Resolve an optional scope; `None` means the whole model.
pub(crate) fn resolve_scope(graph: &Graph, scope: Option<&str>) -> Result<ElementId> {
    let Some(path) = scope else {
        return Ok(graph.root());
    };
    graph.resolve(path).map_err(|err| {
        tracing::warn!("Scope not found: {}", err);
        QueryError::InvalidScope {
            path: path.to_string(),
            resolved_prefix: prefix_of(&err),
        }
    })
}
