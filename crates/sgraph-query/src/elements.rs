//! Element details, one or many at a time

use crate::error::{Result, resolve_element};
use serde::Serialize;
use sgraph_core::{AttributeValue, ElementId, Graph};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementInfo {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub child_count: usize,
    pub incoming_count: usize,
    pub outgoing_count: usize,
    pub external: bool,
}

impl ElementInfo {
    fn of(graph: &Graph, id: ElementId) -> Self {
        let element = &graph[id];
        ElementInfo {
            path: graph.path(id),
            name: element.name.clone(),
            element_type: element.kind().to_string(),
            attributes: element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            child_count: element.children.len(),
            incoming_count: graph.incoming(id).count(),
            outgoing_count: graph.outgoing(id).count(),
            external: element.external,
        }
    }
}

/// Details of a single element.
pub fn element_info(graph: &Graph, path: &str) -> Result<ElementInfo> {
    let id = resolve_element(graph, path)?;
    Ok(ElementInfo::of(graph, id))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementLookup {
    pub requested: usize,
    pub found: Vec<ElementInfo>,
    pub not_found: Vec<String>,
}

/// Resolve many paths at once. Unresolvable paths are listed, never fatal.
pub fn elements<S: AsRef<str>>(graph: &Graph, paths: &[S]) -> ElementLookup {
    let mut found = Vec::new();
    let mut not_found = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match graph.resolve(path) {
            Ok(id) => found.push(ElementInfo::of(graph, id)),
            Err(_) => not_found.push(path.to_string()),
        }
    }
    ElementLookup {
        requested: paths.len(),
        found,
        not_found,
    }
}
