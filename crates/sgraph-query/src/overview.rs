//! High-level dependency overview between units at a chosen level

use crate::error::{Result, resolve_scope};
use serde::{Deserialize, Serialize};
use sgraph_core::{ElementId, Graph, LevelResolver, ResultLevel};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const TOP_UNITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewQuery {
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default = "default_level")]
    pub level: ResultLevel,
    /// Unit pairs with fewer associations are left out.
    #[serde(default = "default_min_count")]
    pub min_count: usize,
    #[serde(default)]
    pub include_external: bool,
}

fn default_level() -> ResultLevel {
    ResultLevel::Directory
}

fn default_min_count() -> usize {
    1
}

impl Default for OverviewQuery {
    fn default() -> Self {
        OverviewQuery {
            scope: None,
            level: default_level(),
            min_count: default_min_count(),
            include_external: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDependency {
    pub from: String,
    pub to: String,
    pub count: usize,
    pub kinds: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDegree {
    pub path: String,
    pub incoming: usize,
    pub outgoing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub scope: String,
    pub level: ResultLevel,
    pub dependencies: Vec<UnitDependency>,
    /// Per-unit association totals over the reported dependencies, by path.
    pub units: Vec<UnitDegree>,
    pub most_depended_upon: Vec<UnitDegree>,
    pub most_dependent: Vec<UnitDegree>,
    /// Unit pairs that depend on each other, each listed once.
    pub circular: Vec<(String, String)>,
}

/// Lift every association whose source lies in the scope to `level` on both
/// ends and count the resulting unit-to-unit dependencies. Self-loops are
/// dropped.
pub fn overview(graph: &Graph, query: &OverviewQuery) -> Result<Overview> {
    let scope = resolve_scope(graph, query.scope.as_deref())?;
    let mut resolver = LevelResolver::new(graph, query.level);

    let mut pairs: HashMap<(ElementId, ElementId), (usize, BTreeMap<String, usize>)> =
        HashMap::new();
    for (source, _) in graph.descendants(scope, None) {
        for association in graph.outgoing(source) {
            let target = association.target;
            if !query.include_external && (graph[source].external || graph[target].external) {
                continue;
            }
            let from = resolver.resolve(source);
            let to = resolver.resolve(target);
            if from == to {
                continue;
            }
            let (count, kinds) = pairs.entry((from, to)).or_default();
            *count += 1;
            *kinds.entry(association.kind().to_string()).or_default() += 1;
        }
    }

    let mut dependencies: Vec<UnitDependency> = pairs
        .into_iter()
        .filter(|(_, (count, _))| *count >= query.min_count)
        .map(|((from, to), (count, kinds))| UnitDependency {
            from: graph.path(from),
            to: graph.path(to),
            count,
            kinds,
        })
        .collect();
    dependencies.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.from.cmp(&b.from))
            .then_with(|| a.to.cmp(&b.to))
    });

    let mut degrees: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for dep in &dependencies {
        degrees.entry(dep.from.as_str()).or_default().1 += dep.count;
        degrees.entry(dep.to.as_str()).or_default().0 += dep.count;
    }
    let units: Vec<UnitDegree> = degrees
        .into_iter()
        .map(|(path, (incoming, outgoing))| UnitDegree {
            path: path.to_string(),
            incoming,
            outgoing,
        })
        .collect();

    let top = |key: fn(&UnitDegree) -> usize| {
        let mut ranked: Vec<UnitDegree> =
            units.iter().filter(|u| key(u) > 0).cloned().collect();
        ranked.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.path.cmp(&b.path)));
        ranked.truncate(TOP_UNITS);
        ranked
    };
    let most_depended_upon = top(|u| u.incoming);
    let most_dependent = top(|u| u.outgoing);

    let edges: HashMap<(&str, &str), usize> = dependencies
        .iter()
        .map(|d| ((d.from.as_str(), d.to.as_str()), d.count))
        .collect();
    let mut circular: Vec<(String, String)> = edges
        .keys()
        .filter(|(a, b)| a < b && edges.contains_key(&(*b, *a)))
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    circular.sort();

    debug!(
        "Overview of '{}' at {} level: {} unit dependencies, {} circular",
        graph.path(scope),
        query.level,
        dependencies.len(),
        circular.len()
    );

    Ok(Overview {
        scope: graph.path(scope),
        level: query.level,
        dependencies,
        units,
        most_depended_upon,
        most_dependent,
        circular,
    })
}
