//! sgraph Registry — model cache, load lifecycle, and default-model selection

pub mod config;
pub mod error;
pub mod loader;
pub mod registry;


pub use config::RegistryConfig;
pub use error::{LoadError, RegistryError, Result};
pub use loader::GraphLoader;
pub use registry::ModelRegistry;
