//! # RAG Retrieval
//!
//! Review-time lookups over an index built by `rag-indexer`: similar files
//! and related symbols for a changed file, plus snippet search.
//!
//! ## Example
//!
//! ```no_run
//! use rag_graph::DependencyGraph;
//! use rag_retrieval::ContextRetriever;
//! use rag_vector_store::{ChunkStorage, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::default();
//!     let storage = ChunkStorage::open(&config).await?;
//!     let graph = DependencyGraph::load(config.persist_dir.join("dependencies.json")).await?;
//!
//!     let retriever = ContextRetriever::new(&storage, &graph);
//!     let context = retriever
//!         .get_context("src/app.py", Some("+    return load()"), None)
//!         .await;
//!     for file in &context.similar_files {
//!         println!("{} {:.3}", file.path, file.relevance);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod context;
mod error;
mod query;
mod retriever;

pub use config::RetrieverConfig;
pub use context::{RelatedFunction, RetrievalContext, SimilarCode, SimilarFile};
pub use error::{Result, RetrievalError};
pub use query::build_query;
pub use retriever::ContextRetriever;

pub use rag_graph::Dependencies;
