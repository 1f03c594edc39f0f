//! Test fixtures for sgraph-query

use sgraph_core::{Attributes, Graph, GraphBuilder, element_type as t};

/// Add `path` to the builder, creating missing owners as directories.
pub fn add_path(builder: &mut GraphBuilder, path: &str, kind: &str) {
    let (parent_path, name) = path.rsplit_once('/').unwrap();
    let parent = match builder.resolve(parent_path) {
        Ok(id) => id,
        Err(_) => {
            add_path(builder, parent_path, t::DIRECTORY);
            builder.resolve(parent_path).unwrap()
        }
    };
    builder
        .add_child(parent, name, kind, Attributes::new())
        .unwrap();
}

/// ```text
/// /app (repository)
///   a.py / foo, helper
///   b.py / bar, baz
///   services (directory)
///     cache.py / CacheManager (class) / get (method)
///     model.py / ModelManager (class)
///     util.py / manage_cache
/// /lib (repository)
///   core.py / run
/// /External (external)
///   Python / os / path
///          / json / loads
/// ```
///
/// `foo` is called by `helper`, `bar` and `baz`: three callers in two files
/// of one repository.
pub fn project_graph() -> Graph {
    let mut b = GraphBuilder::new();
    let root = b.root();
    for (name, kind) in [
        ("app", t::REPOSITORY),
        ("lib", t::REPOSITORY),
        ("External", t::EXTERNAL),
    ] {
        b.add_child(root, name, kind, Attributes::new()).unwrap();
    }

    for (path, kind) in [
        ("/app/a.py", t::FILE),
        ("/app/a.py/foo", t::FUNCTION),
        ("/app/a.py/helper", t::FUNCTION),
        ("/app/b.py", t::FILE),
        ("/app/b.py/bar", t::FUNCTION),
        ("/app/b.py/baz", t::FUNCTION),
        ("/app/services/cache.py", t::FILE),
        ("/app/services/cache.py/CacheManager", t::CLASS),
        ("/app/services/cache.py/CacheManager/get", t::METHOD),
        ("/app/services/model.py", t::FILE),
        ("/app/services/model.py/ModelManager", t::CLASS),
        ("/app/services/util.py", t::FILE),
        ("/app/services/util.py/manage_cache", t::FUNCTION),
        ("/lib/core.py", t::FILE),
        ("/lib/core.py/run", t::FUNCTION),
        ("/External/Python", t::EXTERNAL),
        ("/External/Python/os", t::EXTERNAL),
        ("/External/Python/os/path", t::EXTERNAL),
        ("/External/Python/json", t::EXTERNAL),
        ("/External/Python/json/loads", t::EXTERNAL),
    ] {
        add_path(&mut b, path, kind);
    }

    for (source, target, kind) in EDGES {
        b.add_association_by_path(source, target, kind, Attributes::new())
            .unwrap();
    }
    b.build()
}

pub const EDGES: [(&str, &str, &str); 12] = [
    ("/app/a.py/foo", "/app/b.py/bar", "call"),
    ("/app/a.py/foo", "/app/b.py/baz", "call"),
    ("/app/a.py/helper", "/app/a.py/foo", "call"),
    ("/app/b.py/bar", "/app/a.py/foo", "call"),
    ("/app/b.py/baz", "/app/a.py/foo", "call"),
    ("/app/services/cache.py/CacheManager/get", "/app/b.py/bar", "call"),
    ("/app/services/util.py/manage_cache", "/app/services/cache.py/CacheManager/get", "call"),
    ("/lib/core.py/run", "/app/services/model.py/ModelManager", "call"),
    ("/app/services/model.py/ModelManager", "/lib/core.py/run", "call"),
    ("/app/services/model.py/ModelManager", "/app/services/cache.py/CacheManager", "reference"),
    ("/app/services/cache.py", "/External/Python/os/path", "import"),
    ("/app/services/util.py/manage_cache", "/External/Python/json/loads", "call"),
];

/// A synthetic model with `files` files of `functions` functions each,
/// spread over ten directories. Each function calls the one created after it.
pub fn wide_graph(files: usize, functions: usize) -> Graph {
    let mut b = GraphBuilder::new();
    let root = b.root();
    let repo = b
        .add_child(root, "repo", t::REPOSITORY, Attributes::new())
        .unwrap();
    let dirs: Vec<_> = (0..10)
        .map(|d| {
            b.add_child(repo, &format!("dir{d}"), t::DIRECTORY, Attributes::new())
                .unwrap()
        })
        .collect();
    let mut fns = Vec::new();
    for f in 0..files {
        let file = b
            .add_child(dirs[f % 10], &format!("file{f}.py"), t::FILE, Attributes::new())
            .unwrap();
        for i in 0..functions {
            fns.push(
                b.add_child(file, &format!("func_{f}_{i}"), t::FUNCTION, Attributes::new())
                    .unwrap(),
            );
        }
    }
    for w in fns.windows(2) {
        b.add_association(w[0], w[1], "call", Attributes::new());
    }
    b.build()
}
