//! JSON graph document format
//!
//! ```json
//! {
//!   "elements": [
//!     { "name": "app", "type": "repository", "children": [
//!       { "name": "a.py", "type": "file", "attributes": { "loc": 120 } }
//!     ] }
//!   ],
//!   "associations": [
//!     { "from": "/app/a.py", "to": "/app/b.py", "type": "import" }
//!   ]
//! }
//! ```
//!
//! `elements` are the children of the (implicit) model root. Association
//! endpoints are element paths and must resolve once every element is added.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use sgraph_core::{Attributes, ElementId, Graph, GraphBuilder};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub elements: Vec<ElementNode>,
    #[serde(default)]
    pub associations: Vec<AssociationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationRecord {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl GraphDocument {
    /// Build the graph this document describes. Nothing is returned unless
    /// every element and association is valid.
    pub fn into_graph(self) -> Result<Graph, DocumentError> {
        let mut builder = GraphBuilder::new();
        let root = builder.root();

        // Explicit stack: documents can nest deeper than the call stack likes.
        let mut pending: Vec<(ElementId, ElementNode)> =
            self.elements.into_iter().rev().map(|node| (root, node)).collect();
        while let Some((parent, node)) = pending.pop() {
            let id = builder
                .add_child(parent, &node.name, &node.kind, node.attributes)
                .map_err(|source| DocumentError::Element {
                    parent: builder.path(parent),
                    source,
                })?;
            pending.extend(node.children.into_iter().rev().map(|child| (id, child)));
        }

        for (index, record) in self.associations.into_iter().enumerate() {
            builder
                .add_association_by_path(&record.from, &record.to, &record.kind, record.attributes)
                .map_err(|source| DocumentError::Association {
                    index,
                    from: record.from.clone(),
                    to: record.to.clone(),
                    source,
                })?;
        }

        debug!("Built graph with {} elements", builder.element_count());
        Ok(builder.build())
    }
}

/// Parse a JSON document and build its graph.
pub fn parse_document(bytes: &[u8]) -> Result<Graph, DocumentError> {
    let document: GraphDocument = serde_json::from_slice(bytes)?;
    document.into_graph()
}
