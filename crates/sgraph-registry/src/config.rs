//! Registry configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound for a single model parse.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds a load may take before it is abandoned.
    pub load_timeout_secs: u64,
}

impl RegistryConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}
