//! Loads graph documents from JSON files

use crate::document::parse_document;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sgraph_core::Graph;
use sgraph_registry::GraphLoader;
use std::path::Path;
use tracing::debug;

/// [`GraphLoader`] for JSON graph documents on the local filesystem.
///
/// Sources are file paths. Two spellings of the same file normalize to one
/// canonical path, so they share a cache entry.
#[derive(Debug, Default, Clone)]
pub struct JsonFileLoader;

impl JsonFileLoader {
    pub fn new() -> Self {
        JsonFileLoader
    }
}

#[async_trait]
impl GraphLoader for JsonFileLoader {
    async fn load(&self, source: &str) -> Result<Graph> {
        let bytes = tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read graph document {}", source))?;
        debug!("Read {} bytes from {}", bytes.len(), source);

        // Building a large graph is CPU-bound; keep it off the async workers.
        let graph = tokio::task::spawn_blocking(move || parse_document(&bytes))
            .await
            .context("Graph parse task failed")?
            .with_context(|| format!("Invalid graph document {}", source))?;
        Ok(graph)
    }

    fn normalize(&self, source: &str) -> String {
        let trimmed = source.trim();
        match Path::new(trimmed).canonicalize() {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(_) => trimmed.to_string(),
        }
    }

    fn name(&self) -> &str {
        "json"
    }
}
