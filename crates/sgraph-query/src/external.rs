//! Usage of external (third-party) elements
//!
//! An external branch is the outermost element typed `external`. The segment
//! directly below it names the language, the next one the package:
//! `/External/Python/os/path` is language `Python`, package `os`.

use crate::error::{Result, resolve_scope};
use serde::Serialize;
use sgraph_core::{ElementId, Graph};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

const EXAMPLE_SOURCES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageUsage {
    pub language: String,
    pub edge_count: usize,
    pub unique_targets: usize,
    pub packages: Vec<PackageUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageUsage {
    pub package: String,
    pub edge_count: usize,
    pub unique_targets: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalTarget {
    pub path: String,
    pub edge_count: usize,
    /// First few internal elements using this target.
    pub example_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalUsage {
    pub scope: String,
    pub total_edges: usize,
    pub languages: Vec<LanguageUsage>,
    pub targets: Vec<ExternalTarget>,
}

/// Language and package segment names of an external element, if it sits
/// deep enough under its branch.
fn classify(graph: &Graph, id: ElementId) -> (Option<String>, Option<String>) {
    // Chain from the element up to (excluding) the first non-external owner.
    let chain: Vec<ElementId> = graph
        .self_and_ancestors(id)
        .take_while(|&a| graph[a].external)
        .collect();
    // chain.last() is the branch root; below it come language then package.
    let mut below_branch = chain.iter().rev().skip(1);
    let language = below_branch.next().map(|&a| graph[a].name.clone());
    let package = below_branch.next().map(|&a| graph[a].name.clone());
    (language, package)
}

#[derive(Default)]
struct Tally {
    edges: usize,
    targets: BTreeSet<ElementId>,
}

/// Outgoing associations from internal elements in `scope` (whole model when
/// `None`) into external elements, grouped by language, package and target.
pub fn external_usage(graph: &Graph, scope: Option<&str>) -> Result<ExternalUsage> {
    let scope_id = resolve_scope(graph, scope)?;

    let mut targets: Vec<(ElementId, usize, Vec<String>)> = Vec::new();
    let mut target_slot: HashMap<ElementId, usize> = HashMap::new();
    let mut languages: HashMap<String, Tally> = HashMap::new();
    let mut packages: HashMap<(String, String), Tally> = HashMap::new();
    let mut total_edges = 0;

    for (source, _) in graph.descendants(scope_id, None) {
        if graph[source].external {
            continue;
        }
        for association in graph.outgoing(source) {
            let target = association.target;
            if !graph[target].external {
                continue;
            }
            total_edges += 1;

            let slot = *target_slot.entry(target).or_insert_with(|| {
                targets.push((target, 0, Vec::new()));
                targets.len() - 1
            });
            let (_, count, examples) = &mut targets[slot];
            *count += 1;
            let source_path = graph.path(source);
            if examples.len() < EXAMPLE_SOURCES && !examples.contains(&source_path) {
                examples.push(source_path);
            }

            let (language, package) = classify(graph, target);
            let language = language.unwrap_or_else(|| "unknown".to_string());
            let tally = languages.entry(language.clone()).or_default();
            tally.edges += 1;
            tally.targets.insert(target);
            if let Some(package) = package {
                let tally = packages.entry((language, package)).or_default();
                tally.edges += 1;
                tally.targets.insert(target);
            }
        }
    }

    let mut languages: Vec<LanguageUsage> = languages
        .into_iter()
        .map(|(language, tally)| {
            let mut lang_packages: Vec<PackageUsage> = packages
                .iter()
                .filter(|((lang, _), _)| *lang == language)
                .map(|((_, package), tally)| PackageUsage {
                    package: package.clone(),
                    edge_count: tally.edges,
                    unique_targets: tally.targets.len(),
                })
                .collect();
            lang_packages.sort_by(|a, b| {
                b.edge_count
                    .cmp(&a.edge_count)
                    .then_with(|| a.package.cmp(&b.package))
            });
            LanguageUsage {
                language,
                edge_count: tally.edges,
                unique_targets: tally.targets.len(),
                packages: lang_packages,
            }
        })
        .collect();
    languages.sort_by(|a, b| {
        b.edge_count
            .cmp(&a.edge_count)
            .then_with(|| a.language.cmp(&b.language))
    });

    let mut targets: Vec<ExternalTarget> = targets
        .into_iter()
        .map(|(id, edge_count, example_sources)| ExternalTarget {
            path: graph.path(id),
            edge_count,
            example_sources,
        })
        .collect();
    targets.sort_by(|a, b| b.edge_count.cmp(&a.edge_count).then_with(|| a.path.cmp(&b.path)));

    debug!(
        "External usage in '{}': {} edges to {} targets",
        graph.path(scope_id),
        total_edges,
        targets.len()
    );

    Ok(ExternalUsage {
        scope: graph.path(scope_id),
        total_edges,
        languages,
        targets,
    })
}
