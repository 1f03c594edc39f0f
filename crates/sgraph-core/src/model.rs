//! Core data structures for the element graph

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// Stable arena index of an element inside one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena index of an association inside one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssociationId(pub u32);

/// Conventional element type tags. The set is open; these are the ones the
/// engine gives meaning to.
pub mod element_type {
    pub const REPOSITORY: &str = "repository";
    pub const DIRECTORY: &str = "directory";
    pub const FILE: &str = "file";
    pub const CLASS: &str = "class";
    pub const FUNCTION: &str = "function";
    pub const METHOD: &str = "method";
    pub const EXTERNAL: &str = "external";
}

/// Attribute value attached to elements and associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{v}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

pub type Attributes = HashMap<String, AttributeValue>;

/// A node in the ownership tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    /// Last path segment. Empty only for the root.
    pub name: String,
    /// Element type tag (`file`, `class`, ...). Interned per graph.
    pub kind: Arc<str>,
    pub parent: Option<ElementId>,
    /// Owned children in insertion order.
    pub children: Vec<ElementId>,
    pub attributes: Attributes,
    /// Number of segments between the root and this element.
    pub depth: u32,
    /// True when this element or one of its owners is typed `external`.
    pub external: bool,
}

impl Element {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// A directed dependency edge. Endpoints are arena keys, never references.
#[derive(Debug, Clone)]
pub struct Association {
    pub id: AssociationId,
    pub source: ElementId,
    pub target: ElementId,
    /// Dependency kind (`call`, `import`, ...). Interned per graph.
    pub kind: Arc<str>,
    pub attributes: Attributes,
}

impl Association {
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Opaque identifier assigned to a model when it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        ModelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        ModelId(value.to_string())
    }
}

/// One loaded, immutable graph snapshot.
#[derive(Debug)]
pub struct Model {
    id: ModelId,
    source_location: String,
    loaded_at: DateTime<Utc>,
    graph: Graph,
}

impl Model {
    pub fn new(id: ModelId, source_location: impl Into<String>, graph: Graph) -> Self {
        Model {
            id,
            source_location: source_location.into(),
            loaded_at: Utc::now(),
            graph,
        }
    }

    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn source_location(&self) -> &str {
        &self.source_location
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            id: self.id.clone(),
            source_location: self.source_location.clone(),
            loaded_at: self.loaded_at,
            element_count: self.graph.element_count(),
            association_count: self.graph.association_count(),
        }
    }
}

/// Serializable description of a loaded model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSummary {
    pub id: ModelId,
    pub source_location: String,
    pub loaded_at: DateTime<Utc>,
    pub element_count: usize,
    pub association_count: usize,
}
