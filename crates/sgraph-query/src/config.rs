//! Query defaults

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    /// Search results returned when the caller gives no limit.
    pub max_results: usize,
    /// Structure listing depth when the caller gives none.
    pub structure_depth: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            max_results: 50,
            structure_depth: 2,
        }
    }
}
