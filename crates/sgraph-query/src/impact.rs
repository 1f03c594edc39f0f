//! Change-impact analysis: who depends on an element, at three granularities

use crate::dependencies::{RawEdge, Side, raw_edges};
use crate::error::{Result, resolve_element};
use serde::{Deserialize, Serialize};
use sgraph_core::{ElementId, Graph, LevelResolver, ResultLevel};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactQuery {
    pub element: String,
    /// Count callers of descendants too.
    #[serde(default)]
    pub include_descendants: bool,
    #[serde(default = "default_true")]
    pub include_external: bool,
}

fn default_true() -> bool {
    true
}

impl ImpactQuery {
    pub fn new(element: impl Into<String>) -> Self {
        ImpactQuery {
            element: element.into(),
            include_descendants: false,
            include_external: true,
        }
    }

    pub fn include_descendants(mut self, yes: bool) -> Self {
        self.include_descendants = yes;
        self
    }

    pub fn include_external(mut self, yes: bool) -> Self {
        self.include_external = yes;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub element_type: String,
    /// Incoming associations attributed to this entry.
    pub association_count: usize,
    /// Distinct raw callers behind this entry (1 for detailed entries).
    pub caller_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactSummary {
    /// Distinct raw callers.
    pub incoming_count: usize,
    pub files_affected: usize,
    pub units_affected: usize,
    pub association_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    pub element: String,
    pub summary: ImpactSummary,
    pub detailed: Vec<ImpactEntry>,
    pub files: Vec<ImpactEntry>,
    /// Owning top-level units (repositories, or first-level elements).
    pub units: Vec<ImpactEntry>,
}

/// Accumulates one grouping of the raw pass.
#[derive(Default)]
struct Grouping {
    slots: HashMap<ElementId, (usize, HashSet<ElementId>)>,
}

impl Grouping {
    fn add(&mut self, key: ElementId, caller: ElementId) {
        let (count, callers) = self.slots.entry(key).or_default();
        *count += 1;
        callers.insert(caller);
    }

    fn entries(self, graph: &Graph) -> Vec<ImpactEntry> {
        let mut entries: Vec<ImpactEntry> = self
            .slots
            .into_iter()
            .map(|(id, (association_count, callers))| ImpactEntry {
                path: graph.path(id),
                element_type: graph[id].kind().to_string(),
                association_count,
                caller_count: callers.len(),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// The owner of an element at the resolver's level, else the element
/// directly under the root.
fn owner_at(graph: &Graph, resolver: &mut LevelResolver<'_>, id: ElementId) -> ElementId {
    let resolved = resolver.resolve(id);
    if graph[resolved].is_root() {
        graph.top_level(id).unwrap_or(resolved)
    } else {
        resolved
    }
}

/// Group the incoming dependencies of an element as raw callers, owning
/// files and owning units, from a single pass over the raw associations.
pub fn impact(graph: &Graph, query: &ImpactQuery) -> Result<ImpactReport> {
    let element = resolve_element(graph, &query.element)?;
    let raw: Vec<RawEdge<'_>> = raw_edges(
        graph,
        element,
        Side::Incoming,
        query.include_descendants,
        query.include_external,
    );

    let mut files = LevelResolver::new(graph, ResultLevel::File);
    let mut units = LevelResolver::new(graph, ResultLevel::Repository);
    let mut by_caller = Grouping::default();
    let mut by_file = Grouping::default();
    let mut by_unit = Grouping::default();

    for edge in &raw {
        let caller = edge.far;
        by_caller.add(caller, caller);
        by_file.add(owner_at(graph, &mut files, caller), caller);
        by_unit.add(owner_at(graph, &mut units, caller), caller);
    }

    let detailed = by_caller.entries(graph);
    let files = by_file.entries(graph);
    let units = by_unit.entries(graph);
    let summary = ImpactSummary {
        incoming_count: detailed.len(),
        files_affected: files.len(),
        units_affected: units.len(),
        association_count: raw.len(),
    };

    debug!(
        "Impact of {}: {} callers, {} files, {} units",
        query.element, summary.incoming_count, summary.files_affected, summary.units_affected
    );

    Ok(ImpactReport {
        element: graph.path(element),
        summary,
        detailed,
        files,
        units,
    })
}
