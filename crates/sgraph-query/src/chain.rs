//! Bounded transitive dependency walks

use crate::dependencies::{Direction, Side, raw_edges};
use crate::error::{Result, resolve_element};
use serde::{Deserialize, Serialize};
use sgraph_core::{ElementId, Graph};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainQuery {
    pub element: String,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    /// Maximum hops from the start element. `None` walks to exhaustion.
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_true")]
    pub include_external: bool,
}

fn default_direction() -> Direction {
    Direction::Outgoing
}

fn default_true() -> bool {
    true
}

impl ChainQuery {
    pub fn new(element: impl Into<String>) -> Self {
        ChainQuery {
            element: element.into(),
            direction: Direction::Outgoing,
            max_depth: None,
            include_external: true,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn include_external(mut self, yes: bool) -> Self {
        self.include_external = yes;
        self
    }
}

/// One traversed association. `from`/`to` follow the association's own
/// direction, not the walk's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStep {
    pub from: String,
    pub to: String,
    pub kind: String,
    /// `incoming` or `outgoing` relative to the element being expanded.
    pub direction: Direction,
    /// Hop number, starting at 1.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainNode {
    pub path: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainResult {
    pub element: String,
    pub direction: Direction,
    pub max_depth: Option<usize>,
    /// Reached elements in discovery order, excluding the start.
    pub nodes: Vec<ChainNode>,
    pub steps: Vec<ChainStep>,
    /// Largest hop distance actually reached.
    pub depth_reached: usize,
}

/// Breadth-first walk over associations from an element. Each element is
/// expanded at most once.
pub fn dependency_chain(graph: &Graph, query: &ChainQuery) -> Result<ChainResult> {
    let start = resolve_element(graph, &query.element)?;

    let mut sides = Vec::with_capacity(2);
    if query.direction.includes_outgoing() {
        sides.push(Side::Outgoing);
    }
    if query.direction.includes_incoming() {
        sides.push(Side::Incoming);
    }

    let mut visited: HashSet<ElementId> = HashSet::from([start]);
    let mut queue: VecDeque<(ElementId, usize)> = VecDeque::from([(start, 0)]);
    let mut nodes = Vec::new();
    let mut steps = Vec::new();
    let mut depth_reached = 0;

    while let Some((current, depth)) = queue.pop_front() {
        if query.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        let hop = depth + 1;
        for &side in &sides {
            for edge in raw_edges(graph, current, side, false, query.include_external) {
                let association = edge.association;
                steps.push(ChainStep {
                    from: graph.path(association.source),
                    to: graph.path(association.target),
                    kind: association.kind().to_string(),
                    direction: match side {
                        Side::Incoming => Direction::Incoming,
                        Side::Outgoing => Direction::Outgoing,
                    },
                    depth: hop,
                });
                if visited.insert(edge.far) {
                    depth_reached = depth_reached.max(hop);
                    nodes.push(ChainNode {
                        path: graph.path(edge.far),
                        element_type: graph[edge.far].kind().to_string(),
                        depth: hop,
                    });
                    queue.push_back((edge.far, hop));
                }
            }
        }
    }

    debug!(
        "Chain from {} ({}): {} elements, {} steps, depth {}",
        query.element,
        query.direction,
        nodes.len(),
        steps.len(),
        depth_reached
    );

    Ok(ChainResult {
        element: graph.path(start),
        direction: query.direction,
        max_depth: query.max_depth,
        nodes,
        steps,
        depth_reached,
    })
}
