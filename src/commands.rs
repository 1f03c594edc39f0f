//! CLI command implementations

use crate::Commands;
use crate::config::AppConfig;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use sgraph_loader::JsonFileLoader;
use sgraph_query::{
    ChainQuery, DependencyQuery, ImpactQuery, OverviewQuery, QueryDefaults, SearchQuery,
    SubtreeQuery,
};
use sgraph_registry::ModelRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// Load every model named on the command line; the first becomes the default.
pub async fn open_registry(config: &AppConfig, models: &[PathBuf]) -> anyhow::Result<ModelRegistry> {
    let registry = ModelRegistry::new(Arc::new(JsonFileLoader::new()), config.registry.clone());
    for (i, path) in models.iter().enumerate() {
        let source = path.to_string_lossy();
        let id = registry
            .load(&source)
            .await
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        if i == 0 {
            registry.set_default(&id)?;
        }
    }
    Ok(registry)
}

fn to_value<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run a query command against the default model.
pub fn execute(
    command: &Commands,
    registry: &ModelRegistry,
    defaults: &QueryDefaults,
) -> anyhow::Result<Value> {
    let model = match command {
        Commands::Version => {
            return to_value(serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }));
        }
        Commands::Models => return to_value(registry.models()),
        _ => registry
            .default_model()
            .context("No model loaded; pass one with --model FILE")?,
    };
    let graph = model.graph();
    tracing::debug!("Querying model {} ({})", model.id(), model.source_location());

    match command {
        Commands::Search {
            pattern,
            scope,
            types,
            max_results,
        } => {
            let mut query = SearchQuery::new(
                pattern.as_str(),
                max_results.unwrap_or(defaults.max_results),
            )
            .types(types.iter().cloned());
            query.scope = scope.clone();
            to_value(sgraph_query::search(graph, &query)?)
        }
        Commands::Deps {
            element,
            direction,
            level,
            descendants,
            no_external,
            limit,
        } => {
            let query = DependencyQuery {
                element: element.clone(),
                direction: *direction,
                result_level: *level,
                include_descendants: *descendants,
                include_external: !no_external,
                limit: *limit,
            };
            to_value(sgraph_query::dependencies(graph, &query)?)
        }
        Commands::Chain {
            element,
            direction,
            max_depth,
            no_external,
        } => {
            let query = ChainQuery {
                element: element.clone(),
                direction: *direction,
                max_depth: *max_depth,
                include_external: !no_external,
            };
            to_value(sgraph_query::dependency_chain(graph, &query)?)
        }
        Commands::Impact {
            element,
            descendants,
            no_external,
        } => {
            let query = ImpactQuery::new(element.as_str())
                .include_descendants(*descendants)
                .include_external(!no_external);
            to_value(sgraph_query::impact(graph, &query)?)
        }
        Commands::Structure { element, depth } => to_value(sgraph_query::structure(
            graph,
            element,
            depth.unwrap_or(defaults.structure_depth),
        )?),
        Commands::Subtree {
            root,
            max_depth,
            no_external,
        } => {
            let query = SubtreeQuery {
                root: root.clone(),
                include_external: !no_external,
                max_depth: *max_depth,
            };
            to_value(sgraph_query::subtree_dependencies(graph, &query)?)
        }
        Commands::External { scope } => {
            to_value(sgraph_query::external_usage(graph, scope.as_deref())?)
        }
        Commands::Overview {
            scope,
            level,
            min_count,
            include_external,
        } => {
            let query = OverviewQuery {
                scope: scope.clone(),
                level: *level,
                min_count: *min_count,
                include_external: *include_external,
            };
            to_value(sgraph_query::overview(graph, &query)?)
        }
        Commands::Elements { paths } => to_value(sgraph_query::elements(graph, paths)),
        Commands::Models | Commands::Version => unreachable!("handled before model lookup"),
    }
}
