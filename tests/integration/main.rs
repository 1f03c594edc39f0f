//! Integration tests for sgraph
//!
//! These tests load real documents from disk through the registry and run
//! queries against them, and drive the CLI binary end to end.

use serde_json::Value;
use sgraph_core::ResultLevel;
use sgraph_loader::JsonFileLoader;
use sgraph_query::{
    DependencyQuery, Direction, ImpactQuery, SearchQuery, dependencies, impact, search, structure,
};
use sgraph_registry::{ModelRegistry, RegistryConfig};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

const MODEL: &str = r#"{
  "elements": [
    { "name": "app", "type": "repository", "children": [
      { "name": "a.py", "type": "file", "children": [
        { "name": "foo", "type": "function" },
        { "name": "helper", "type": "function" }
      ] },
      { "name": "b.py", "type": "file", "children": [
        { "name": "bar", "type": "function" },
        { "name": "baz", "type": "function" }
      ] },
      { "name": "services", "type": "directory", "children": [
        { "name": "cache.py", "type": "file", "children": [
          { "name": "CacheManager", "type": "class" }
        ] },
        { "name": "model.py", "type": "file", "children": [
          { "name": "ModelManager", "type": "class" }
        ] }
      ] }
    ] },
    { "name": "External", "type": "external", "children": [
      { "name": "Python", "type": "external", "children": [
        { "name": "os", "type": "external" }
      ] }
    ] }
  ],
  "associations": [
    { "from": "/app/a.py/foo", "to": "/app/b.py/bar", "type": "call" },
    { "from": "/app/a.py/foo", "to": "/app/b.py/baz", "type": "call" },
    { "from": "/app/a.py/helper", "to": "/app/a.py/foo", "type": "call" },
    { "from": "/app/b.py/bar", "to": "/app/a.py/foo", "type": "call" },
    { "from": "/app/b.py/baz", "to": "/app/a.py/foo", "type": "call" },
    { "from": "/app/services/model.py/ModelManager", "to": "/app/services/cache.py/CacheManager", "type": "reference" },
    { "from": "/app/services/cache.py", "to": "/External/Python/os", "type": "import" }
  ]
}"#;

fn write_model(dir: &TempDir, name: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, MODEL).unwrap();
    path.to_str().unwrap().to_string()
}

fn registry() -> ModelRegistry {
    ModelRegistry::new(Arc::new(JsonFileLoader::new()), RegistryConfig::default())
}

fn run_cli(args: &[&str]) -> (bool, Value, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_sgraph"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute sgraph");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let json = serde_json::from_str(&stdout).unwrap_or(Value::Null);
    (output.status.success(), json, stderr)
}

/// Loading from disk and querying the cached model
#[tokio::test]
async fn test_load_and_query_model() {
    let dir = TempDir::new().unwrap();
    let source = write_model(&dir, "model.json");
    let registry = registry();

    let id = registry.load(&source).await.unwrap();
    registry.set_default(&id).unwrap();
    let model = registry.default_model().unwrap();
    let graph = model.graph();

    let classes = search(
        graph,
        &SearchQuery::new("*Manager*", 50)
            .scope("/app")
            .types(["class"]),
    )
    .unwrap();
    assert_eq!(classes.total_count, 2);

    let report = impact(graph, &ImpactQuery::new("/app/a.py/foo")).unwrap();
    assert_eq!(report.summary.incoming_count, 3);
    assert_eq!(report.summary.files_affected, 2);
    assert_eq!(report.summary.units_affected, 1);

    let deps = dependencies(
        graph,
        &DependencyQuery::new("/app/a.py/foo")
            .direction(Direction::Outgoing)
            .level(ResultLevel::File),
    )
    .unwrap();
    let outgoing = deps.outgoing.unwrap();
    assert_eq!(outgoing.paths(), vec!["/app/b.py"]);
    assert_eq!(outgoing.edges[0].association_count, 2);

    let tree = structure(graph, "/app/services", 1).unwrap();
    assert_eq!(tree.children.len(), 2);
}

/// Concurrent loads of one file collapse into a single model
#[tokio::test]
async fn test_concurrent_loads_from_disk() {
    let dir = TempDir::new().unwrap();
    let source = write_model(&dir, "model.json");
    let registry = Arc::new(registry());

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let source = source.clone();
            tokio::spawn(async move { registry.load(&source).await })
        })
        .collect();
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }

    assert!(ids.iter().all(|id| id == &ids[0]));
    assert_eq!(registry.len(), 1);
}

/// A held model survives a reload of its source
#[tokio::test]
async fn test_reload_keeps_old_snapshot_readable() {
    let dir = TempDir::new().unwrap();
    let source = write_model(&dir, "model.json");
    let registry = registry();
    let old_id = registry.load(&source).await.unwrap();
    let old = registry.get(&old_id).unwrap();

    std::fs::write(
        Path::new(&source),
        r#"{ "elements": [ { "name": "other", "type": "repository" } ] }"#,
    )
    .unwrap();
    let new_id = registry.reload(&source).await.unwrap();

    assert_ne!(old_id, new_id);
    assert!(old.graph().resolve("/app/a.py/foo").is_ok());
    let new = registry.get(&new_id).unwrap();
    assert!(new.graph().resolve("/app").is_err());
    assert!(new.graph().resolve("/other").is_ok());
}

/// A broken document leaves the registry untouched
#[tokio::test]
async fn test_broken_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    let good = write_model(&dir, "good.json");
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{ "elements": [ { "name": "x" } ] }"#).unwrap();
    let registry = registry();
    registry.load(&good).await.unwrap();

    assert!(registry.load(bad.to_str().unwrap()).await.is_err());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.loads_in_flight(), 0);
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_sgraph"))
        .arg("--help")
        .output()
        .expect("Failed to execute sgraph");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Structure and dependency queries"));
}

#[test]
fn test_cli_search() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "model.json");

    let (ok, json, stderr) = run_cli(&["--model", &model, "search", "*Manager*", "--type", "class"]);

    assert!(ok, "sgraph failed: {stderr}");
    assert_eq!(json["mode"], "wildcard");
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["matches"][0]["path"], "/app/services/cache.py/CacheManager");
}

#[test]
fn test_cli_deps_and_impact() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "model.json");

    let (ok, deps, stderr) = run_cli(&[
        "--model",
        &model,
        "deps",
        "/app/a.py/foo",
        "--direction",
        "outgoing",
        "--level",
        "file",
    ]);
    assert!(ok, "sgraph failed: {stderr}");
    assert_eq!(deps["outgoing"]["edges"][0]["path"], "/app/b.py");
    assert!(deps.get("incoming").is_none());

    let (ok, report, stderr) = run_cli(&["--model", &model, "impact", "/app/a.py/foo"]);
    assert!(ok, "sgraph failed: {stderr}");
    assert_eq!(report["summary"]["incoming_count"], 3);
    assert_eq!(report["summary"]["files_affected"], 2);
    assert_eq!(report["summary"]["units_affected"], 1);
}

#[test]
fn test_cli_config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "model.json");
    let config = dir.path().join("sgraph.toml");
    std::fs::write(&config, "[query]\nmax_results = 1\nstructure_depth = 1\n").unwrap();
    let config = config.to_str().unwrap();

    let (ok, json, stderr) = run_cli(&["--config", config, "--model", &model, "search", "a"]);
    assert!(ok, "sgraph failed: {stderr}");
    assert_eq!(json["matches"].as_array().unwrap().len(), 1);
    assert_eq!(json["truncated"], true);

    let (ok, tree, stderr) = run_cli(&["--config", config, "--model", &model, "structure", "/app"]);
    assert!(ok, "sgraph failed: {stderr}");
    assert!(tree["children"][0].get("children").is_none());
}

#[test]
fn test_cli_reports_missing_element() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "model.json");

    let (ok, _, stderr) = run_cli(&["--model", &model, "impact", "/app/nope"]);

    assert!(!ok);
    assert!(stderr.contains("/app/nope"));
}

#[test]
fn test_cli_requires_model_for_queries() {
    let (ok, _, stderr) = run_cli(&["structure"]);

    assert!(!ok);
    assert!(stderr.contains("--model"));
}

#[test]
fn test_cli_models_listing() {
    let dir = TempDir::new().unwrap();
    let first = write_model(&dir, "first.json");
    let second = write_model(&dir, "second.json");

    let (ok, json, stderr) = run_cli(&["--model", &first, "--model", &second, "models"]);

    assert!(ok, "sgraph failed: {stderr}");
    let models = json.as_array().unwrap();
    assert_eq!(models.len(), 2);
    assert!(models.iter().all(|m| m["association_count"] == 7));
}

#[test]
fn test_cli_version() {
    let (ok, json, stderr) = run_cli(&["version"]);

    assert!(ok, "sgraph failed: {stderr}");
    assert_eq!(json["name"], "sgraph");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
