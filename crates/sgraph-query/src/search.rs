//! Pattern search over element names
//!
//! Pattern interpretation is fixed, checked in this order:
//!
//! 1. **Regex** when the pattern contains regex-only syntax: any of
//!    `^ $ + ( ) [ ] { } | \`, or a `.` immediately followed by `*`, `+`
//!    or `?` (as in `.*Manager.*`).
//! 2. **Wildcard** when it contains `*` or `?` and nothing from (1). The
//!    glob must match the whole name.
//! 3. **Substring** otherwise (`.` is literal, so `a.py` works as typed).
//!
//! Regex and substring patterns match anywhere in the name. Every mode is
//! case-insensitive.

use crate::error::{QueryError, Result, resolve_scope};
use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use sgraph_core::Graph;
use tracing::debug;

const REGEX_ONLY: &[char] = &['^', '$', '+', '(', ')', '[', ']', '{', '}', '|', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Substring,
    Wildcard,
    Regex,
}

impl MatchMode {
    /// Which mode `pattern` is interpreted in.
    pub fn classify(pattern: &str) -> MatchMode {
        let dot_quantifier = [".*", ".+", ".?"].iter().any(|q| pattern.contains(q));
        if dot_quantifier || pattern.contains(REGEX_ONLY) {
            MatchMode::Regex
        } else if pattern.contains(['*', '?']) {
            MatchMode::Wildcard
        } else {
            MatchMode::Substring
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Glob(GlobMatcher),
}

/// A compiled name pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    mode: MatchMode,
    matcher: Matcher,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| QueryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        let mode = MatchMode::classify(pattern);
        let matcher = match mode {
            MatchMode::Substring => Matcher::Regex(
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            MatchMode::Regex => Matcher::Regex(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            MatchMode::Wildcard => Matcher::Glob(
                GlobBuilder::new(pattern)
                    .case_insensitive(true)
                    .literal_separator(false)
                    .build()
                    .map_err(|e| invalid(e.to_string()))?
                    .compile_matcher(),
            ),
        };
        Ok(NamePattern { mode, matcher })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_match(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(re) => re.is_match(name),
            Matcher::Glob(glob) => glob.is_match(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub pattern: String,
    #[serde(default)]
    pub scope: Option<String>,
    /// Only elements whose type is listed are candidates. Empty = any type.
    #[serde(default)]
    pub types: Vec<String>,
    pub max_results: usize,
}

impl SearchQuery {
    pub fn new(pattern: impl Into<String>, max_results: usize) -> Self {
        SearchQuery {
            pattern: pattern.into(),
            scope: None,
            types: Vec::new(),
            max_results,
        }
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub scope: String,
    pub pattern: String,
    pub mode: MatchMode,
    pub matches: Vec<SearchHit>,
    /// Matches in the whole scope, including those past `max_results`.
    pub total_count: usize,
    pub truncated: bool,
}

/// Find elements in the scope subtree whose name matches the pattern.
///
/// Walks the scope in pre-order using stored child order. Collection stops at
/// `max_results` but counting continues so `total_count` is exact. The
/// model root is never a candidate.
pub fn search(graph: &Graph, query: &SearchQuery) -> Result<SearchResult> {
    let scope = resolve_scope(graph, query.scope.as_deref())?;
    let pattern = NamePattern::new(&query.pattern)?;

    let mut matches = Vec::new();
    let mut total_count = 0;
    for (id, _) in graph.descendants(scope, None) {
        let element = &graph[id];
        if element.is_root() {
            continue;
        }
        if !query.types.is_empty() && !query.types.iter().any(|t| t == element.kind()) {
            continue;
        }
        if !pattern.is_match(&element.name) {
            continue;
        }
        total_count += 1;
        if matches.len() < query.max_results {
            matches.push(SearchHit {
                path: graph.path(id),
                name: element.name.clone(),
                element_type: element.kind().to_string(),
            });
        }
    }

    debug!(
        "Search '{}' ({:?}) in '{}': {} of {} matches",
        query.pattern,
        pattern.mode(),
        graph.path(scope),
        matches.len(),
        total_count
    );

    Ok(SearchResult {
        scope: graph.path(scope),
        pattern: query.pattern.clone(),
        mode: pattern.mode(),
        truncated: total_count > matches.len(),
        matches,
        total_count,
    })
}
