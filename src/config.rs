//! Configuration file

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sgraph_query::QueryDefaults;
use sgraph_registry::RegistryConfig;
use std::path::Path;

/// Contents of the `--config` TOML file. Every section is optional.
///
/// ```toml
/// [registry]
/// load_timeout_secs = 60
///
/// [query]
/// max_results = 100
/// structure_depth = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub query: QueryDefaults,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
        let Some(path) = path else {
            return Ok(AppConfig::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
