//! # RAG Indexer
//!
//! Walks a repository and feeds the storage adapter and dependency graph.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> FileScanner (ignore dirs / suffixes, supported extensions)
//!     │      └─> source files
//!     │
//!     ├──> LanguageParser
//!     │      └─> symbol chunks + imports + exports
//!     │
//!     ├──> ChunkStorage      file chunk, then symbol chunks, then metadata
//!     │
//!     └──> DependencyGraph   imports / exports / imported_by
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rag_graph::DependencyGraph;
//! use rag_indexer::{CodebaseIndexer, IndexerConfig};
//! use rag_vector_store::{paths, ChunkStorage, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::default();
//!     let mut storage = ChunkStorage::open(&config).await?;
//!     let mut graph =
//!         DependencyGraph::load(paths::dependency_graph_path(&config.persist_dir)).await?;
//!
//!     let mut indexer =
//!         CodebaseIndexer::new(".", IndexerConfig::default(), &mut storage, &mut graph)?;
//!     let report = indexer.index_all().await?;
//!
//!     println!("Indexed {} files, {} chunks", report.success, report.chunks);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod git;
mod indexer;
mod scanner;
mod stats;

pub use config::{IndexerConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_PERSIST_EVERY};
pub use error::{IndexerError, Result};
pub use git::changed_files;
pub use indexer::CodebaseIndexer;
pub use scanner::FileScanner;
pub use stats::IndexReport;
