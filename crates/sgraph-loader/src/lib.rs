//! sgraph Loader — JSON graph documents and the file loader that feeds the
//! model registry

pub mod document;
pub mod error;
pub mod json_loader;


pub use document::{AssociationRecord, ElementNode, GraphDocument, parse_document};
pub use error::DocumentError;
pub use json_loader::JsonFileLoader;
