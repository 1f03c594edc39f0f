//! sgraph Query — search, dependency, impact and structure queries over a
//! loaded graph
//!
//! Every query takes a `&Graph` and returns a serializable result. Queries
//! are read-only and never lock, so any number may run against the same
//! model at once.

pub mod chain;
pub mod config;
pub mod dependencies;
pub mod elements;
pub mod error;
pub mod external;
pub mod impact;
pub mod overview;
pub mod search;
pub mod structure;
pub mod subtree;


#[cfg(test)]
pub mod test_utils;

pub use chain::{ChainNode, ChainQuery, ChainResult, ChainStep, dependency_chain};
pub use config::QueryDefaults;
pub use dependencies::{
    DependencyEdge, DependencyList, DependencyQuery, DependencyResult, Direction, dependencies,
};
pub use elements::{ElementInfo, ElementLookup, element_info, elements};
pub use error::{QueryError, Result};
pub use external::{ExternalTarget, ExternalUsage, LanguageUsage, PackageUsage, external_usage};
pub use impact::{ImpactEntry, ImpactQuery, ImpactReport, ImpactSummary, impact};
pub use overview::{Overview, OverviewQuery, UnitDegree, UnitDependency, overview};
pub use search::{MatchMode, NamePattern, SearchHit, SearchQuery, SearchResult, search};
pub use structure::{StructureNode, structure};
pub use subtree::{SubtreeDependencies, SubtreeEdge, SubtreeQuery, subtree_dependencies};
