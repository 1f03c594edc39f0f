//! Bounded-depth hierarchy listing

use crate::error::{Result, resolve_element};
use serde::Serialize;
use sgraph_core::{ElementId, Graph};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureNode {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: String,
    /// Total direct children, including any cut off by the depth bound.
    pub child_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// Pre-order `(depth, path)` pairs, this node at depth 0.
    pub fn flatten(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a str)>) {
        out.push((depth, self.path.as_str()));
        for child in &self.children {
            child.flatten_into(depth + 1, out);
        }
    }
}

/// The element and its descendants down to `max_depth` levels
/// (1 = immediate children, 0 = the element alone).
pub fn structure(graph: &Graph, element: &str, max_depth: usize) -> Result<StructureNode> {
    let id = resolve_element(graph, element)?;
    let node = build(graph, id, max_depth);
    debug!("Structure of {} to depth {}", element, max_depth);
    Ok(node)
}

fn build(graph: &Graph, id: ElementId, remaining: usize) -> StructureNode {
    let element = &graph[id];
    let children = if remaining == 0 {
        Vec::new()
    } else {
        graph
            .children(id)
            .iter()
            .map(|&child| build(graph, child, remaining - 1))
            .collect()
    };
    StructureNode {
        path: graph.path(id),
        name: element.name.clone(),
        element_type: element.kind().to_string(),
        child_count: element.children.len(),
        children,
    }
}
