//! # RAG Vector Store
//!
//! Embedding, document storage and the storage adapter used by the indexer
//! and the context retriever.
//!
//! ## Architecture
//!
//! ```text
//! CodeChunk
//!     │
//!     ├──> document text   "{kind}: {name}\nFile: {path}\n{content}"
//!     │
//!     ├──> Embedder        hashed | stub
//!     │      └─> Vec<f32>
//!     │
//!     └──> DocumentStore   JsonDocumentStore
//!            ├─> FlatIndex (exact cosine search)
//!            └─> collection.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rag_vector_store::{ChunkStorage, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> rag_vector_store::Result<()> {
//!     let mut storage = ChunkStorage::open(&StoreConfig::default()).await?;
//!
//!     let query = storage.encode("parse configuration file").await?;
//!     for hit in storage.query(&query, 5).await {
//!         println!("{} {:.3}", hit.metadata.file, hit.relevance());
//!     }
//!
//!     storage.persist().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod document_store;
mod embeddings;
mod error;
mod flat_index;
pub mod paths;
mod storage;
mod store;
mod types;

pub use config::{EmbeddingConfig, StoreConfig};
pub use document_store::DocumentStore;
pub use embeddings::{
    cosine_similarity, Embedder, EmbeddingMode, EmbeddingModel, DEFAULT_DIMENSION,
    EMBEDDING_MODE_ENV,
};
pub use error::{Result, VectorStoreError};
pub use flat_index::FlatIndex;
pub use storage::{document_text, ChunkStorage};
pub use store::{JsonDocumentStore, COLLECTION_SCHEMA_VERSION};
pub use types::{
    ChunkMetadata, DocumentRecord, MetadataFilter, QueryMatch, StoreStats, StoredDocument,
};

// Re-export chunk types for convenience
pub use rag_code_chunker::{ChunkKind, CodeChunk};
