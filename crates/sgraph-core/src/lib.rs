//! sgraph Core — element tree, association index, and level aggregation

pub mod aggregation;
pub mod error;
pub mod graph;
pub mod model;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use aggregation::{AggregatedEdge, EdgeAggregator, LevelResolver, ResultLevel, resolve_level};
pub use error::{GraphError, Result};
pub use graph::{Ancestors, Descendants, Graph, GraphBuilder, path_segments};
pub use model::{
    Association, AssociationId, AttributeValue, Attributes, Element, ElementId, Model, ModelId,
    ModelSummary, element_type,
};
