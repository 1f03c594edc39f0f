//! Unit tests for sgraph-core

use crate::test_utils::sample_graph;
use crate::*;
use std::collections::HashSet;

#[test]
fn test_path_round_trip() {
    let graph = sample_graph();

    for element in graph.elements() {
        let path = graph.path(element.id);
        let resolved = graph.resolve(&path).unwrap();
        assert_eq!(resolved, element.id, "round trip failed for {}", path);
    }
}

#[test]
fn test_resolve_accepts_root_forms() {
    let graph = sample_graph();

    assert_eq!(graph.resolve("").unwrap(), graph.root());
    assert_eq!(graph.resolve("/").unwrap(), graph.root());
    assert_eq!(graph.path(graph.root()), "");
}

#[test]
fn test_resolve_reports_longest_prefix() {
    let graph = sample_graph();

    let err = graph.resolve("/app/services/nope.py/Thing").unwrap_err();
    match err {
        GraphError::PathNotFound {
            resolved_prefix,
            missing,
            ..
        } => {
            assert_eq!(resolved_prefix, "/app/services");
            assert_eq!(missing, "nope.py");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_resolve_rejects_empty_segments() {
    let graph = sample_graph();

    let err = graph.resolve("/app//a.py").unwrap_err();
    assert!(matches!(err, GraphError::InvalidPath { .. }));
}

#[test]
fn test_builder_rejects_bad_children() {
    let mut builder = GraphBuilder::new();
    let root = builder.root();
    builder
        .add_child(root, "app", element_type::REPOSITORY, Attributes::new())
        .unwrap();

    let dup = builder.add_child(root, "app", element_type::DIRECTORY, Attributes::new());
    assert!(matches!(dup, Err(GraphError::DuplicateChild { .. })));

    let slash = builder.add_child(root, "a/b", element_type::FILE, Attributes::new());
    assert!(matches!(slash, Err(GraphError::InvalidName { .. })));

    let empty = builder.add_child(root, "", element_type::FILE, Attributes::new());
    assert!(matches!(empty, Err(GraphError::InvalidName { .. })));
}

#[test]
fn test_wide_parent_uses_child_index() {
    let mut builder = GraphBuilder::new();
    let root = builder.root();
    let dir = builder
        .add_child(root, "wide", element_type::DIRECTORY, Attributes::new())
        .unwrap();
    for i in 0..100 {
        builder
            .add_child(dir, &format!("f{i}.rs"), element_type::FILE, Attributes::new())
            .unwrap();
    }
    let graph = builder.build();

    let id = graph.resolve("/wide/f42.rs").unwrap();
    assert_eq!(graph[id].name, "f42.rs");
    assert_eq!(graph.children(graph.resolve("/wide").unwrap()).len(), 100);
    assert!(graph.resolve("/wide/f100.rs").is_err());
}

#[test]
fn test_children_keep_insertion_order() {
    let graph = sample_graph();
    let services = graph.resolve("/app/services").unwrap();

    let names: Vec<&str> = graph
        .children(services)
        .iter()
        .map(|&c| graph[c].name.as_str())
        .collect();
    assert_eq!(names, vec!["cache.py", "model.py", "util.py"]);
}

#[test]
fn test_every_association_indexed_once_each_way() {
    let graph = sample_graph();

    for association in graph.associations() {
        let outgoing_hits = graph
            .elements()
            .map(|e| graph.outgoing(e.id).filter(|a| a.id == association.id).count())
            .sum::<usize>();
        let incoming_hits = graph
            .elements()
            .map(|e| graph.incoming(e.id).filter(|a| a.id == association.id).count())
            .sum::<usize>();
        assert_eq!(outgoing_hits, 1);
        assert_eq!(incoming_hits, 1);
        assert!(graph.outgoing(association.source).any(|a| a.id == association.id));
        assert!(graph.incoming(association.target).any(|a| a.id == association.id));
    }
}

#[test]
fn test_descendants_preorder_and_depth_bound() {
    let graph = sample_graph();
    let services = graph.resolve("/app/services").unwrap();

    let all: Vec<String> = graph
        .descendants(services, None)
        .map(|(id, _)| graph.path(id))
        .collect();
    assert_eq!(
        all,
        vec![
            "/app/services",
            "/app/services/cache.py",
            "/app/services/cache.py/CacheManager",
            "/app/services/cache.py/CacheManager/get",
            "/app/services/model.py",
            "/app/services/model.py/ModelManager",
            "/app/services/util.py",
            "/app/services/util.py/manage_cache",
        ]
    );

    let shallow: Vec<usize> = graph.descendants(services, Some(1)).map(|(_, d)| d).collect();
    assert_eq!(shallow, vec![0, 1, 1, 1]);
}

#[test]
fn test_relative_path_and_containment() {
    let graph = sample_graph();
    let app = graph.resolve("/app").unwrap();
    let get = graph.resolve("/app/services/cache.py/CacheManager/get").unwrap();
    let lib = graph.resolve("/lib").unwrap();

    assert_eq!(
        graph.relative_path(app, get).as_deref(),
        Some("services/cache.py/CacheManager/get")
    );
    assert_eq!(graph.relative_path(app, app).as_deref(), Some(""));
    assert_eq!(graph.relative_path(lib, get), None);
    assert!(graph.is_within(get, app));
    assert!(!graph.is_within(get, lib));
    assert_eq!(graph.top_level(get), Some(app));
}

#[test]
fn test_external_flag_propagates() {
    let graph = sample_graph();

    let os_path = graph.resolve("/app/External/Python/os/path").unwrap();
    let foo = graph.resolve("/app/a.py/foo").unwrap();
    assert!(graph[os_path].external);
    assert!(!graph[foo].external);
}

#[test]
fn test_resolve_level_walks_ownership_chain() {
    let graph = sample_graph();
    let get = graph.resolve("/app/services/cache.py/CacheManager/get").unwrap();

    let file = resolve_level(&graph, get, ResultLevel::File);
    let dir = resolve_level(&graph, get, ResultLevel::Directory);
    let repo = resolve_level(&graph, get, ResultLevel::Repository);
    assert_eq!(graph.path(file), "/app/services/cache.py");
    assert_eq!(graph.path(dir), "/app/services");
    assert_eq!(graph.path(repo), "/app");
    assert_eq!(resolve_level(&graph, get, ResultLevel::Raw), get);
}

#[test]
fn test_resolve_level_degrades_on_irregular_hierarchy() {
    let graph = sample_graph();
    let os_path = graph.resolve("/app/External/Python/os/path").unwrap();
    let foo = graph.resolve("/app/a.py/foo").unwrap();

    // No file or directory owns the external element: lift to the repository.
    let file = resolve_level(&graph, os_path, ResultLevel::File);
    assert_eq!(graph.path(file), "/app");

    // a.py sits directly in the repository.
    let dir = resolve_level(&graph, foo, ResultLevel::Directory);
    assert_eq!(graph.path(dir), "/app");

    // Nothing above the root qualifies.
    let mut builder = GraphBuilder::new();
    let root = builder.root();
    let loose = builder
        .add_child(root, "loose", element_type::FUNCTION, Attributes::new())
        .unwrap();
    let bare = builder.build();
    assert_eq!(resolve_level(&bare, loose, ResultLevel::Repository), bare.root());
}

#[test]
fn test_aggregation_is_order_independent() {
    let graph = sample_graph();

    for association in graph.associations() {
        for endpoint in [association.source, association.target] {
            let via_file = resolve_level(
                &graph,
                resolve_level(&graph, endpoint, ResultLevel::File),
                ResultLevel::Repository,
            );
            let via_dir = resolve_level(
                &graph,
                resolve_level(&graph, endpoint, ResultLevel::Directory),
                ResultLevel::Repository,
            );
            let direct = resolve_level(&graph, endpoint, ResultLevel::Repository);
            assert_eq!(via_file, direct);
            assert_eq!(via_dir, direct);
        }
    }
}

#[test]
fn test_edge_aggregator_merges_by_endpoint() {
    let graph = sample_graph();
    let foo = graph.resolve("/app/a.py/foo").unwrap();

    let mut aggregator = EdgeAggregator::new(&graph, ResultLevel::File);
    for association in graph.outgoing(foo) {
        aggregator.add(foo, association.target, association);
    }
    let edges = aggregator.finish();

    assert_eq!(edges.len(), 1);
    assert_eq!(graph.path(edges[0].endpoint), "/app/b.py");
    assert_eq!(edges[0].count, 2);
    assert_eq!(edges[0].raw_endpoints.len(), 2);
    assert_eq!(edges[0].kind_counts.get("call"), Some(&2));
}

#[test]
fn test_kinds_are_interned() {
    let graph = sample_graph();
    let calls: Vec<&Association> = graph.associations().filter(|a| a.kind() == "call").collect();

    assert!(calls.len() > 1);
    assert!(std::sync::Arc::ptr_eq(&calls[0].kind, &calls[1].kind));
}

#[test]
fn test_result_level_parsing() {
    let cases = [
        ("raw", ResultLevel::Raw),
        ("FILE", ResultLevel::File),
        ("dir", ResultLevel::Directory),
        ("module", ResultLevel::Repository),
    ];
    for (text, expected) in cases {
        assert_eq!(text.parse::<ResultLevel>().unwrap(), expected);
    }
    assert!("class".parse::<ResultLevel>().is_err());
}

#[test]
fn test_model_summary() {
    let graph = sample_graph();
    let elements = graph.element_count();
    let model = Model::new(ModelId::from("m1"), "/tmp/model.json", graph);

    let summary = model.summary();
    assert_eq!(summary.id.as_str(), "m1");
    assert_eq!(summary.element_count, elements);
    assert_eq!(summary.association_count, 8);
}

#[test]
fn test_attribute_value_serialization() {
    let values: Vec<AttributeValue> = serde_json::from_str(r#"[3, 1.5, "text"]"#).unwrap();

    assert_eq!(
        values,
        vec![
            AttributeValue::Integer(3),
            AttributeValue::Float(1.5),
            AttributeValue::Text("text".to_string()),
        ]
    );
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(rendered.join(","), @"3,1.5,text");
}

#[test]
fn test_distinct_ids() {
    let graph = sample_graph();
    let ids: HashSet<ElementId> = graph.elements().map(|e| e.id).collect();
    assert_eq!(ids.len(), graph.element_count());
}
