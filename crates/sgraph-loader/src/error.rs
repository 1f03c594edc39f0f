//! Document errors

use sgraph_core::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed graph document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid element under '{parent}': {source}")]
    Element {
        parent: String,
        #[source]
        source: GraphError,
    },

    #[error("association #{index} ({from} -> {to}): {source}")]
    Association {
        index: usize,
        from: String,
        to: String,
        #[source]
        source: GraphError,
    },
}
