//! Registry errors

use sgraph_core::ModelId;
use std::time::Duration;
use thiserror::Error;

/// Why a load produced no model. Cloneable so every caller that joined the
/// same load receives the same outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to load '{source_location}': {reason}")]
    Failed {
        source_location: String,
        reason: String,
    },

    #[error("loading '{source_location}' timed out after {timeout:?}")]
    TimedOut {
        source_location: String,
        timeout: Duration,
    },

    #[error("load of '{source_location}' was cancelled before it finished")]
    Abandoned { source_location: String },
}

impl LoadError {
    pub fn source_location(&self) -> &str {
        match self {
            LoadError::Failed {
                source_location, ..
            }
            | LoadError::TimedOut {
                source_location, ..
            }
            | LoadError::Abandoned { source_location } => source_location,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("model not loaded: {model_id}")]
    ModelNotFound { model_id: ModelId },

    #[error("no default model has been designated")]
    NoDefaultModel,

    #[error(transparent)]
    Load(#[from] LoadError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
