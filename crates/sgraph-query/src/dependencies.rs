//! Incoming/outgoing dependency queries with level aggregation

use crate::error::{Result, resolve_element};
use serde::{Deserialize, Serialize};
use sgraph_core::{
    AggregatedEdge, Association, EdgeAggregator, ElementId, Graph, GraphError, ResultLevel,
};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_incoming(self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }

    pub fn includes_outgoing(self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
            Direction::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "incoming" | "in" => Ok(Direction::Incoming),
            "outgoing" | "out" => Ok(Direction::Outgoing),
            "both" => Ok(Direction::Both),
            other => Err(GraphError::UnknownVariant {
                kind: "direction",
                value: other.to_string(),
                expected: "incoming, outgoing, both",
            }),
        }
    }
}

/// Which end of an association the queried element sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    /// Element is the target; the far end is the source.
    Incoming,
    /// Element is the source; the far end is the target.
    Outgoing,
}

/// One association seen from the queried element.
pub(crate) struct RawEdge<'g> {
    /// The queried element or one of its descendants.
    pub origin: ElementId,
    pub far: ElementId,
    pub association: &'g Association,
}

/// Associations touching `element` (and its descendants when asked) on
/// `side`, in subtree pre-order then stored association order.
pub(crate) fn raw_edges<'g>(
    graph: &'g Graph,
    element: ElementId,
    side: Side,
    include_descendants: bool,
    include_external: bool,
) -> Vec<RawEdge<'g>> {
    let origins: Vec<ElementId> = if include_descendants {
        graph.descendants(element, None).map(|(id, _)| id).collect()
    } else {
        vec![element]
    };

    let mut edges = Vec::new();
    for origin in origins {
        let associations: Box<dyn Iterator<Item = &'g Association> + 'g> = match side {
            Side::Incoming => Box::new(graph.incoming(origin)),
            Side::Outgoing => Box::new(graph.outgoing(origin)),
        };
        for association in associations {
            let far = match side {
                Side::Incoming => association.source,
                Side::Outgoing => association.target,
            };
            if !include_external && graph[far].external {
                continue;
            }
            edges.push(RawEdge {
                origin,
                far,
                association,
            });
        }
    }
    edges
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyQuery {
    pub element: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub result_level: ResultLevel,
    #[serde(default)]
    pub include_descendants: bool,
    #[serde(default = "default_true")]
    pub include_external: bool,
    /// Cap per direction list. `None` returns every edge.
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl DependencyQuery {
    pub fn new(element: impl Into<String>) -> Self {
        DependencyQuery {
            element: element.into(),
            direction: Direction::Both,
            result_level: ResultLevel::Raw,
            include_descendants: false,
            include_external: true,
            limit: None,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn level(mut self, level: ResultLevel) -> Self {
        self.result_level = level;
        self
    }

    pub fn include_descendants(mut self, yes: bool) -> Self {
        self.include_descendants = yes;
        self
    }

    pub fn include_external(mut self, yes: bool) -> Self {
        self.include_external = yes;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An aggregated edge as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    /// Far endpoint after level resolution.
    pub path: String,
    #[serde(rename = "type")]
    pub element_type: String,
    /// Originating descendant relative to the queried element. `None` when
    /// the element itself is the origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub association_count: u32,
    /// Distinct raw far endpoints merged into this edge.
    pub endpoint_count: usize,
    pub kinds: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DependencyList {
    pub edges: Vec<DependencyEdge>,
    /// Edges before truncation.
    pub total_edges: usize,
    /// Raw associations before truncation.
    pub total_associations: usize,
    pub truncated: bool,
}

impl DependencyList {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Far endpoint paths in listing order.
    pub fn paths(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.path.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyResult {
    pub element: String,
    pub direction: Direction,
    pub result_level: ResultLevel,
    pub include_descendants: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<DependencyList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<DependencyList>,
}

impl DependencyResult {
    pub fn is_empty(&self) -> bool {
        self.incoming.as_ref().is_none_or(DependencyList::is_empty)
            && self.outgoing.as_ref().is_none_or(DependencyList::is_empty)
    }
}

/// Associations of an element, aggregated to the requested level.
///
/// With [`Direction::Both`] the two lists are computed and truncated
/// independently.
pub fn dependencies(graph: &Graph, query: &DependencyQuery) -> Result<DependencyResult> {
    let element = resolve_element(graph, &query.element)?;

    let list = |side| {
        let raw = raw_edges(
            graph,
            element,
            side,
            query.include_descendants,
            query.include_external,
        );
        build_list(graph, element, raw, query.result_level, query.limit)
    };
    let incoming = query
        .direction
        .includes_incoming()
        .then(|| list(Side::Incoming));
    let outgoing = query
        .direction
        .includes_outgoing()
        .then(|| list(Side::Outgoing));

    debug!(
        "Dependencies of {} ({}, level {}): {} in, {} out",
        query.element,
        query.direction,
        query.result_level,
        incoming.as_ref().map_or(0, |l| l.total_edges),
        outgoing.as_ref().map_or(0, |l| l.total_edges)
    );

    Ok(DependencyResult {
        element: graph.path(element),
        direction: query.direction,
        result_level: query.result_level,
        include_descendants: query.include_descendants,
        incoming,
        outgoing,
    })
}

fn build_list(
    graph: &Graph,
    element: ElementId,
    raw: Vec<RawEdge<'_>>,
    level: ResultLevel,
    limit: Option<usize>,
) -> DependencyList {
    let total_associations = raw.len();
    let mut aggregator = EdgeAggregator::new(graph, level);
    for edge in &raw {
        aggregator.add(edge.origin, edge.far, edge.association);
    }

    let mut edges: Vec<DependencyEdge> = aggregator
        .finish()
        .into_iter()
        .map(|edge| to_edge(graph, element, edge))
        .collect();
    edges.sort_by(|a, b| a.origin.cmp(&b.origin).then_with(|| a.path.cmp(&b.path)));

    let total_edges = edges.len();
    if let Some(limit) = limit {
        edges.truncate(limit);
    }
    DependencyList {
        truncated: edges.len() < total_edges,
        edges,
        total_edges,
        total_associations,
    }
}

fn to_edge(graph: &Graph, element: ElementId, edge: AggregatedEdge) -> DependencyEdge {
    let origin = if edge.origin == element {
        None
    } else {
        graph.relative_path(element, edge.origin)
    };
    DependencyEdge {
        path: graph.path(edge.endpoint),
        element_type: graph[edge.endpoint].kind().to_string(),
        origin,
        association_count: edge.count,
        endpoint_count: edge.raw_endpoints.len(),
        kinds: edge.kind_counts,
    }
}

