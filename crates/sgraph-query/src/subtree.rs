//! Dependencies of a whole subtree, split by whether they cross its boundary

use crate::error::{Result, resolve_element};
use serde::{Deserialize, Serialize};
use sgraph_core::{ElementId, Graph};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreeQuery {
    pub root: String,
    #[serde(default = "default_true")]
    pub include_external: bool,
    /// Depth below `root` whose elements are considered. `None` = all.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl SubtreeQuery {
    pub fn new(root: impl Into<String>) -> Self {
        SubtreeQuery {
            root: root.into(),
            include_external: true,
            max_depth: None,
        }
    }

    pub fn include_external(mut self, yes: bool) -> Self {
        self.include_external = yes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtreeEdge {
    pub from: String,
    pub to: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtreeDependencies {
    pub root: String,
    pub element_count: usize,
    /// Both ends inside the subtree.
    pub internal: Vec<SubtreeEdge>,
    /// Source outside, target inside.
    pub incoming: Vec<SubtreeEdge>,
    /// Source inside, target outside.
    pub outgoing: Vec<SubtreeEdge>,
}

/// Every association touching the considered part of a subtree, classified
/// by which ends fall inside it.
pub fn subtree_dependencies(graph: &Graph, query: &SubtreeQuery) -> Result<SubtreeDependencies> {
    let root = resolve_element(graph, &query.root)?;
    let members: Vec<ElementId> = graph
        .descendants(root, query.max_depth)
        .map(|(id, _)| id)
        .collect();
    let inside: HashSet<ElementId> = members.iter().copied().collect();

    let edge = |source: ElementId, target: ElementId, kind: &str| SubtreeEdge {
        from: graph.path(source),
        to: graph.path(target),
        kind: kind.to_string(),
    };

    let mut internal = Vec::new();
    let mut incoming = Vec::new();
    let mut outgoing = Vec::new();
    for &member in &members {
        for association in graph.outgoing(member) {
            let target = association.target;
            if inside.contains(&target) {
                internal.push(edge(member, target, association.kind()));
            } else if query.include_external || !graph[target].external {
                outgoing.push(edge(member, target, association.kind()));
            }
        }
        for association in graph.incoming(member) {
            let source = association.source;
            // Internal edges were recorded from the source side.
            if inside.contains(&source) {
                continue;
            }
            if query.include_external || !graph[source].external {
                incoming.push(edge(source, member, association.kind()));
            }
        }
    }

    debug!(
        "Subtree {}: {} elements, {} internal, {} in, {} out",
        query.root,
        members.len(),
        internal.len(),
        incoming.len(),
        outgoing.len()
    );

    Ok(SubtreeDependencies {
        root: graph.path(root),
        element_count: members.len(),
        internal,
        incoming,
        outgoing,
    })
}
