//! Graph store: an arena-backed ownership tree plus a petgraph association index

use crate::error::{GraphError, Result};
use crate::model::*;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

/// Parents with more children than this get a hashed name index.
const CHILD_INDEX_THRESHOLD: usize = 16;

/// Split a canonical path into segments. The root is `""` or `"/"`.
pub fn path_segments(path: &str) -> Result<Vec<&str>> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(GraphError::InvalidPath {
            path: path.to_string(),
            reason: "empty path segment".to_string(),
        });
    }
    Ok(segments)
}

fn join_segments(segments: &[&str]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// An immutable element graph. Elements form a tree through
/// `parent`/`children`; associations are stored as petgraph edges so that
/// both incoming and outgoing lookups cost O(degree).
pub struct Graph {
    inner: DiGraph<Element, Association>,
    root: ElementId,
    child_index: HashMap<ElementId, HashMap<String, ElementId>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("element_count", &self.inner.node_count())
            .field("association_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Get an element by ID.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.inner.node_weight(NodeIndex::new(id.index()))
    }

    /// Get an association by ID.
    pub fn association(&self, id: AssociationId) -> Option<&Association> {
        self.inner.edge_weight(EdgeIndex::new(id.0 as usize))
    }

    pub fn element_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn association_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all elements in arena order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.inner.node_weights()
    }

    /// Iterate over all associations in arena order.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.inner.edge_weights()
    }

    /// Associations where `id` is the source.
    pub fn outgoing(&self, id: ElementId) -> impl Iterator<Item = &Association> {
        self.inner
            .edges_directed(NodeIndex::new(id.index()), Direction::Outgoing)
            .map(|edge_ref| edge_ref.weight())
    }

    /// Associations where `id` is the target.
    pub fn incoming(&self, id: ElementId) -> impl Iterator<Item = &Association> {
        self.inner
            .edges_directed(NodeIndex::new(id.index()), Direction::Incoming)
            .map(|edge_ref| edge_ref.weight())
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self[id].children
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self[id].parent
    }

    /// Find a direct child by name.
    pub fn child(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        if let Some(index) = self.child_index.get(&parent) {
            return index.get(name).copied();
        }
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].name == name)
    }

    /// Resolve a canonical path. Fails on the first unmatched segment and
    /// reports the longest prefix that did resolve.
    pub fn resolve(&self, path: &str) -> Result<ElementId> {
        let segments = path_segments(path)?;
        let mut current = self.root;
        for (depth, segment) in segments.iter().enumerate() {
            match self.child(current, segment) {
                Some(next) => current = next,
                None => {
                    return Err(GraphError::PathNotFound {
                        path: path.to_string(),
                        resolved_prefix: join_segments(&segments[..depth]),
                        missing: segment.to_string(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// Canonical path of an element (`""` for the root).
    pub fn path(&self, id: ElementId) -> String {
        let mut names: Vec<&str> = self
            .self_and_ancestors(id)
            .map(|a| self[a].name.as_str())
            .collect();
        names.pop(); // root
        names.reverse();
        join_segments(&names)
    }

    /// Path of `descendant` relative to `ancestor` (`""` when equal), or
    /// `None` if `descendant` is not inside `ancestor`.
    pub fn relative_path(&self, ancestor: ElementId, descendant: ElementId) -> Option<String> {
        let stop = self[ancestor].depth;
        let mut names = Vec::new();
        let mut current = descendant;
        while self[current].depth > stop {
            names.push(self[current].name.as_str());
            current = self[current].parent?;
        }
        if current != ancestor {
            return None;
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Owners of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self[id].parent,
        }
    }

    /// `id` followed by its owners.
    pub fn self_and_ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: Some(id),
        }
    }

    /// True when `id` is `scope` or lies beneath it.
    pub fn is_within(&self, id: ElementId, scope: ElementId) -> bool {
        let scope_depth = self[scope].depth;
        let mut current = id;
        while self[current].depth > scope_depth {
            match self[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        current == scope
    }

    /// Pre-order walk of `id` and its descendants. `max_depth` is relative
    /// to `id` (0 yields only `id`, 1 adds direct children).
    pub fn descendants(&self, id: ElementId, max_depth: Option<usize>) -> Descendants<'_> {
        Descendants {
            graph: self,
            stack: vec![(id, 0)],
            max_depth,
        }
    }

    /// The ancestor directly under the root (or `id` itself when top-level).
    pub fn top_level(&self, id: ElementId) -> Option<ElementId> {
        self.self_and_ancestors(id).find(|&a| self[a].depth == 1)
    }
}

impl Index<ElementId> for Graph {
    type Output = Element;

    fn index(&self, id: ElementId) -> &Element {
        &self.inner[NodeIndex::new(id.index())]
    }
}

/// Iterator over an ownership chain.
pub struct Ancestors<'g> {
    graph: &'g Graph,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = self.graph[current].parent;
        Some(current)
    }
}

/// Pre-order subtree iterator yielding `(element, relative depth)`.
pub struct Descendants<'g> {
    graph: &'g Graph,
    stack: Vec<(ElementId, usize)>,
    max_depth: Option<usize>,
}

impl Iterator for Descendants<'_> {
    type Item = (ElementId, usize);

    fn next(&mut self) -> Option<(ElementId, usize)> {
        let (current, depth) = self.stack.pop()?;
        if self.max_depth.is_none_or(|max| depth < max) {
            // Reverse so the first child is popped first.
            for &child in self.graph[current].children.iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some((current, depth))
    }
}

/// Incrementally constructs a [`Graph`]. This is the only way to mutate
/// elements; a built graph is read-only.
pub struct GraphBuilder {
    inner: DiGraph<Element, Association>,
    root: ElementId,
    names: HashMap<(ElementId, String), ElementId>,
    interned: HashMap<String, Arc<str>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        let mut builder = GraphBuilder {
            inner: DiGraph::new(),
            root: ElementId(0),
            names: HashMap::new(),
            interned: HashMap::new(),
        };
        let kind = builder.intern("");
        let idx = builder.inner.add_node(Element {
            id: ElementId(0),
            name: String::new(),
            kind,
            parent: None,
            children: Vec::new(),
            attributes: Attributes::new(),
            depth: 0,
            external: false,
        });
        builder.root = ElementId(idx.index() as u32);
        builder
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.interned.get(value) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(value);
        self.interned.insert(value.to_string(), Arc::clone(&interned));
        interned
    }

    /// Path of an element added so far.
    pub fn path(&self, id: ElementId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            let element = &self.inner[NodeIndex::new(c.index())];
            if element.parent.is_some() {
                names.push(element.name.as_str());
            }
            current = element.parent;
        }
        names.reverse();
        join_segments(&names)
    }

    /// Add an owned child under `parent`.
    pub fn add_child(
        &mut self,
        parent: ElementId,
        name: &str,
        kind: &str,
        attributes: Attributes,
    ) -> Result<ElementId> {
        if name.is_empty() || name.contains('/') {
            return Err(GraphError::InvalidName {
                name: name.to_string(),
                reason: "names must be non-empty and must not contain '/'".to_string(),
            });
        }
        let parent_idx = NodeIndex::new(parent.index());
        let (parent_depth, parent_external) = match self.inner.node_weight(parent_idx) {
            Some(p) => (p.depth, p.external),
            None => {
                return Err(GraphError::InvalidPath {
                    path: format!("#{}", parent.0),
                    reason: "parent element does not exist".to_string(),
                });
            }
        };
        if self.names.contains_key(&(parent, name.to_string())) {
            return Err(GraphError::DuplicateChild {
                parent: self.path(parent),
                name: name.to_string(),
            });
        }

        let kind = self.intern(kind);
        let external = parent_external || &*kind == element_type::EXTERNAL;
        let idx = self.inner.add_node(Element {
            id: ElementId(0),
            name: name.to_string(),
            kind,
            parent: Some(parent),
            children: Vec::new(),
            attributes,
            depth: parent_depth + 1,
            external,
        });
        let id = ElementId(idx.index() as u32);
        self.inner[idx].id = id;
        self.inner[parent_idx].children.push(id);
        self.names.insert((parent, name.to_string()), id);
        Ok(id)
    }

    /// Resolve a path against the elements added so far.
    pub fn resolve(&self, path: &str) -> Result<ElementId> {
        let segments = path_segments(path)?;
        let mut current = self.root;
        for (depth, segment) in segments.iter().enumerate() {
            match self.names.get(&(current, segment.to_string())) {
                Some(&next) => current = next,
                None => {
                    return Err(GraphError::PathNotFound {
                        path: path.to_string(),
                        resolved_prefix: join_segments(&segments[..depth]),
                        missing: segment.to_string(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// Add a directed association. Both ids must come from this builder.
    pub fn add_association(
        &mut self,
        source: ElementId,
        target: ElementId,
        kind: &str,
        attributes: Attributes,
    ) -> AssociationId {
        let kind = self.intern(kind);
        let idx = self.inner.add_edge(
            NodeIndex::new(source.index()),
            NodeIndex::new(target.index()),
            Association {
                id: AssociationId(0),
                source,
                target,
                kind,
                attributes,
            },
        );
        let id = AssociationId(idx.index() as u32);
        self.inner[idx].id = id;
        id
    }

    /// Add an association between two already-added paths.
    pub fn add_association_by_path(
        &mut self,
        source: &str,
        target: &str,
        kind: &str,
        attributes: Attributes,
    ) -> Result<AssociationId> {
        let source = self.resolve(source)?;
        let target = self.resolve(target)?;
        Ok(self.add_association(source, target, kind, attributes))
    }

    pub fn element_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Freeze the builder into a read-only graph.
    pub fn build(self) -> Graph {
        let mut child_index = HashMap::new();
        for element in self.inner.node_weights() {
            if element.children.len() > CHILD_INDEX_THRESHOLD {
                let names: HashMap<String, ElementId> = element
                    .children
                    .iter()
                    .map(|&c| (self.inner[NodeIndex::new(c.index())].name.clone(), c))
                    .collect();
                child_index.insert(element.id, names);
            }
        }
        tracing::debug!(
            "Graph built: {} elements, {} associations, {} indexed parents",
            self.inner.node_count(),
            self.inner.edge_count(),
            child_index.len()
        );
        Graph {
            inner: self.inner,
            root: self.root,
            child_index,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
