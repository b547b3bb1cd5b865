//! # RAG Graph
//!
//! File-level dependency graph for the review index.
//!
//! ```text
//! path ──> { imports, exports, imported_by }
//!             │
//!             └─ filled when an importer is indexed after its target
//! ```
//!
//! The whole graph lives in one JSON document that is rewritten on every
//! mutation and loaded as a unit.

mod dependency_graph;
mod error;
mod module_path;

pub use dependency_graph::{Dependencies, DependencyGraph, DependencyNode};
pub use error::{GraphError, Result};
