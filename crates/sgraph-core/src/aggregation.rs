//! Level resolution and edge aggregation over the ownership tree

use crate::error::GraphError;
use crate::graph::Graph;
use crate::model::{Association, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Granularity an association endpoint is lifted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultLevel {
    #[default]
    Raw,
    File,
    Directory,
    Repository,
}

impl ResultLevel {
    fn rank(self) -> u8 {
        match self {
            ResultLevel::Raw => 0,
            ResultLevel::File => 1,
            ResultLevel::Directory => 2,
            ResultLevel::Repository => 3,
        }
    }

    /// The level an element type tag stands for, if any.
    pub fn of_type(kind: &str) -> Option<ResultLevel> {
        match kind {
            "file" => Some(ResultLevel::File),
            "directory" | "dir" => Some(ResultLevel::Directory),
            "repository" | "repo" => Some(ResultLevel::Repository),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultLevel::Raw => "raw",
            ResultLevel::File => "file",
            ResultLevel::Directory => "directory",
            ResultLevel::Repository => "repository",
        }
    }
}

impl fmt::Display for ResultLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultLevel {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(ResultLevel::Raw),
            "file" => Ok(ResultLevel::File),
            "directory" | "dir" => Ok(ResultLevel::Directory),
            "repository" | "repo" | "module" => Ok(ResultLevel::Repository),
            _ => Err(GraphError::UnknownVariant {
                kind: "result level",
                value: s.to_string(),
                expected: "raw, file, directory, repository",
            }),
        }
    }
}

/// Lift `id` to `level` by walking its ownership chain (self first).
///
/// The walk stops at the first element whose type stands for `level` or a
/// coarser level, so a function that sits directly in a directory lifts to
/// that directory at file level. When nothing on the chain qualifies the
/// model root is returned.
pub fn resolve_level(graph: &Graph, id: ElementId, level: ResultLevel) -> ElementId {
    if level == ResultLevel::Raw {
        return id;
    }
    graph
        .self_and_ancestors(id)
        .find(|&a| ResultLevel::of_type(graph[a].kind()).is_some_and(|l| l.rank() >= level.rank()))
        .unwrap_or_else(|| graph.root())
}

/// Memoizing wrapper around [`resolve_level`] for one query.
pub struct LevelResolver<'g> {
    graph: &'g Graph,
    level: ResultLevel,
    memo: HashMap<ElementId, ElementId>,
}

impl<'g> LevelResolver<'g> {
    pub fn new(graph: &'g Graph, level: ResultLevel) -> Self {
        LevelResolver {
            graph,
            level,
            memo: HashMap::new(),
        }
    }

    pub fn level(&self) -> ResultLevel {
        self.level
    }

    pub fn resolve(&mut self, id: ElementId) -> ElementId {
        if self.level == ResultLevel::Raw {
            return id;
        }
        let (graph, level) = (self.graph, self.level);
        *self
            .memo
            .entry(id)
            .or_insert_with(|| resolve_level(graph, id, level))
    }
}

/// A group of raw associations that resolved to the same endpoint pair.
#[derive(Debug, Clone)]
pub struct AggregatedEdge {
    /// Near endpoint: the queried element or the descendant that originated
    /// the associations.
    pub origin: ElementId,
    /// Far endpoint after level resolution.
    pub endpoint: ElementId,
    /// How many underlying associations this represents.
    pub count: u32,
    /// Breakdown by association kind.
    pub kind_counts: BTreeMap<String, u32>,
    /// Distinct raw far endpoints merged into this edge.
    pub raw_endpoints: HashSet<ElementId>,
}

/// Groups raw associations by `(origin, resolved far endpoint)`, keeping
/// first-seen order.
pub struct EdgeAggregator<'g> {
    resolver: LevelResolver<'g>,
    slots: HashMap<(ElementId, ElementId), usize>,
    edges: Vec<AggregatedEdge>,
}

impl<'g> EdgeAggregator<'g> {
    pub fn new(graph: &'g Graph, level: ResultLevel) -> Self {
        EdgeAggregator {
            resolver: LevelResolver::new(graph, level),
            slots: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Record `association`, whose far end is `far`, against `origin`.
    pub fn add(&mut self, origin: ElementId, far: ElementId, association: &Association) {
        let endpoint = self.resolver.resolve(far);
        let slot = *self.slots.entry((origin, endpoint)).or_insert_with(|| {
            self.edges.push(AggregatedEdge {
                origin,
                endpoint,
                count: 0,
                kind_counts: BTreeMap::new(),
                raw_endpoints: HashSet::new(),
            });
            self.edges.len() - 1
        });
        let edge = &mut self.edges[slot];
        edge.count += 1;
        *edge
            .kind_counts
            .entry(association.kind().to_string())
            .or_insert(0) += 1;
        edge.raw_endpoints.insert(far);
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn finish(self) -> Vec<AggregatedEdge> {
        self.edges
    }
}
