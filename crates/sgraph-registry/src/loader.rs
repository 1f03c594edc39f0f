//! Seam between the registry and whatever decodes a model source

use anyhow::Result;
use sgraph_core::Graph;

/// Turns a source location into a built [`Graph`].
///
/// Implementations own the on-disk or wire format; the registry only assigns
/// identity, caches the result, and bounds the call with a timeout.
#[async_trait::async_trait]
pub trait GraphLoader: Send + Sync {
    /// Parse `source` into a graph.
    async fn load(&self, source: &str) -> Result<Graph>;

    /// Cache key for `source`. Two sources that normalize to the same key
    /// are considered the same model.
    fn normalize(&self, source: &str) -> String {
        source.trim().to_string()
    }

    /// Loader name, for logs.
    fn name(&self) -> &str;
}
