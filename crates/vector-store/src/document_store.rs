use crate::error::Result;
use crate::types::{ChunkMetadata, DocumentRecord, MetadataFilter, QueryMatch, StoredDocument};
use async_trait::async_trait;

/// Vector-capable document store backing the storage adapter.
///
/// Mutations may be buffered; [`DocumentStore::persist`] makes them durable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or overwrite the record with `doc.id`
    async fn upsert(&mut self, doc: StoredDocument) -> Result<()>;

    async fn get(&self, filter: &MetadataFilter) -> Result<Vec<DocumentRecord>>;

    /// Replace metadata of an existing record; `false` if `id` is unknown
    async fn update_metadata(&mut self, id: &str, metadata: ChunkMetadata) -> Result<bool>;

    /// Remove the given ids, returning how many existed
    async fn delete(&mut self, ids: &[String]) -> Result<usize>;

    /// Up to `n` nearest neighbours, closest first
    async fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<QueryMatch>>;

    async fn count(&self) -> Result<usize>;

    async fn persist(&mut self) -> Result<()>;

    /// Delete the whole collection, in memory and on disk
    async fn drop_collection(&mut self) -> Result<()>;
}
