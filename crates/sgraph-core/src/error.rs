//! Errors raised while building or addressing a graph

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Path walk stopped at `missing`; `resolved_prefix` is the deepest
    /// element that did resolve (empty for the root).
    #[error("element not found: '{path}' (no '{missing}' under '{resolved_prefix}')")]
    PathNotFound {
        path: String,
        resolved_prefix: String,
        missing: String,
    },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid element name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("duplicate child '{name}' under '{parent}'")]
    DuplicateChild { parent: String, name: String },

    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl GraphError {
    /// Longest resolvable prefix for path errors.
    pub fn resolved_prefix(&self) -> Option<&str> {
        match self {
            GraphError::PathNotFound {
                resolved_prefix, ..
            } => Some(resolved_prefix),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
