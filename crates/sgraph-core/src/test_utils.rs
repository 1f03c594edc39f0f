//! Test fixtures for sgraph-core

use crate::graph::{Graph, GraphBuilder};
use crate::model::{Attributes, ElementId, element_type as t};

/// Add `path` to the builder, creating missing owners as directories.
pub fn add_path(builder: &mut GraphBuilder, path: &str, kind: &str) -> ElementId {
    let (parent_path, name) = path.rsplit_once('/').unwrap();
    let parent = match builder.resolve(parent_path) {
        Ok(id) => id,
        Err(_) => add_path(builder, parent_path, t::DIRECTORY),
    };
    builder.add_child(parent, name, kind, Attributes::new()).unwrap()
}

/// A two-repository model:
///
/// ```text
/// /app (repository)
///   a.py (file) / foo (function), helper (function)
///   b.py (file) / bar, baz (function)
///   services (directory) / cache.py (file) / CacheManager (class) / get (method)
///                        / model.py (file) / ModelManager (class)
///                        / util.py (file) / manage_cache (function)
///   External (external) / Python / os / path
/// /lib (repository)
///   core.py (file) / run (function)
/// ```
pub fn sample_graph() -> Graph {
    let mut b = GraphBuilder::new();
    let root = b.root();
    b.add_child(root, "app", t::REPOSITORY, Attributes::new()).unwrap();
    b.add_child(root, "lib", t::REPOSITORY, Attributes::new()).unwrap();

    add_path(&mut b, "/app/a.py", t::FILE);
    add_path(&mut b, "/app/a.py/foo", t::FUNCTION);
    add_path(&mut b, "/app/a.py/helper", t::FUNCTION);
    add_path(&mut b, "/app/b.py", t::FILE);
    add_path(&mut b, "/app/b.py/bar", t::FUNCTION);
    add_path(&mut b, "/app/b.py/baz", t::FUNCTION);
    add_path(&mut b, "/app/services/cache.py", t::FILE);
    add_path(&mut b, "/app/services/cache.py/CacheManager", t::CLASS);
    add_path(&mut b, "/app/services/cache.py/CacheManager/get", t::METHOD);
    add_path(&mut b, "/app/services/model.py", t::FILE);
    add_path(&mut b, "/app/services/model.py/ModelManager", t::CLASS);
    add_path(&mut b, "/app/services/util.py", t::FILE);
    add_path(&mut b, "/app/services/util.py/manage_cache", t::FUNCTION);
    add_path(&mut b, "/app/External", t::EXTERNAL);
    add_path(&mut b, "/app/External/Python", t::EXTERNAL);
    add_path(&mut b, "/app/External/Python/os", t::EXTERNAL);
    add_path(&mut b, "/app/External/Python/os/path", t::EXTERNAL);
    add_path(&mut b, "/lib/core.py", t::FILE);
    add_path(&mut b, "/lib/core.py/run", t::FUNCTION);

    let edges = [
        ("/app/a.py/foo", "/app/b.py/bar", "call"),
        ("/app/a.py/foo", "/app/b.py/baz", "call"),
        ("/app/a.py/helper", "/app/a.py/foo", "call"),
        ("/app/b.py/bar", "/app/a.py/foo", "call"),
        ("/app/services/cache.py/CacheManager/get", "/app/a.py/foo", "call"),
        ("/app/services/cache.py", "/app/External/Python/os/path", "import"),
        ("/app/services/model.py/ModelManager", "/app/services/cache.py/CacheManager", "reference"),
        ("/lib/core.py/run", "/app/services/model.py/ModelManager", "call"),
    ];
    for (source, target, kind) in edges {
        b.add_association_by_path(source, target, kind, Attributes::new())
            .unwrap();
    }
    b.build()
}
