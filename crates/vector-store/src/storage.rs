use crate::config::StoreConfig;
use crate::document_store::DocumentStore;
use crate::embeddings::{Embedder, EmbeddingModel};
use crate::error::Result;
use crate::store::JsonDocumentStore;
use crate::types::{
    ChunkMetadata, DocumentRecord, MetadataFilter, QueryMatch, StoreStats, StoredDocument,
};
use rag_code_chunker::{ChunkKind, CodeChunk};
use std::collections::BTreeSet;

/// Storage adapter over an embedder and a document store.
///
/// Write and query operations never fail: backend and embedding errors are
/// logged and turned into `false`, zero or empty results. Only opening the
/// store, encoding, persisting and resetting surface errors.
pub struct ChunkStorage {
    embedder: Box<dyn Embedder>,
    backend: Box<dyn DocumentStore>,
}

impl ChunkStorage {
    pub fn new(embedder: Box<dyn Embedder>, backend: Box<dyn DocumentStore>) -> Self {
        Self { embedder, backend }
    }

    /// Open the JSON store described by `config` with the local embedder.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let mode = config.embedding.resolve_mode()?;
        let embedder = EmbeddingModel::new(mode, config.embedding.dimension)?;
        let backend = JsonDocumentStore::open(&config.persist_dir, embedder.dimension()).await?;
        log::info!(
            "Opened store at {} (embedding={mode}, dimension={})",
            config.persist_dir.display(),
            config.embedding.dimension
        );
        Ok(Self::new(Box::new(embedder), Box::new(backend)))
    }

    pub async fn upsert(&mut self, chunk: &CodeChunk) -> bool {
        match self.try_upsert(chunk).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to store chunk {} ({}): {e}", chunk.id, chunk.path);
                false
            }
        }
    }

    async fn try_upsert(&mut self, chunk: &CodeChunk) -> Result<()> {
        let document = document_text(chunk);
        let embedding = self.embedder.embed(&document).await?;
        self.backend
            .upsert(StoredDocument {
                id: chunk.id.clone(),
                document,
                embedding,
                metadata: ChunkMetadata::from(chunk),
            })
            .await
    }

    /// Remove the file record and every child record of `path`.
    pub async fn delete_by_path(&mut self, path: &str) -> usize {
        let result: Result<usize> = async {
            let ids: Vec<String> = self
                .backend
                .get(&MetadataFilter::by_file(path))
                .await?
                .into_iter()
                .map(|record| record.id)
                .collect();
            if ids.is_empty() {
                return Ok(0);
            }
            self.backend.delete(&ids).await
        }
        .await;

        match result {
            Ok(removed) => {
                log::debug!("Deleted {removed} records for {path}");
                removed
            }
            Err(e) => {
                log::warn!("Failed to delete records for {path}: {e}");
                0
            }
        }
    }

    /// Patch imports/exports on the file record of `path`.
    ///
    /// Returns `false` without touching anything when the file record does
    /// not exist yet.
    pub async fn update_dependencies(
        &mut self,
        path: &str,
        imports: &[String],
        exports: &[String],
    ) -> bool {
        let result: Result<bool> = async {
            let filter = MetadataFilter::by_file(path).with_kind(ChunkKind::File);
            let Some(record) = self.backend.get(&filter).await?.into_iter().next() else {
                return Ok(false);
            };
            let mut metadata = record.metadata;
            metadata.imports = imports.to_vec();
            metadata.exports = exports.to_vec();
            self.backend.update_metadata(&record.id, metadata).await
        }
        .await;

        match result {
            Ok(updated) => {
                if !updated {
                    log::debug!("No file record for {path}, dependency update skipped");
                }
                updated
            }
            Err(e) => {
                log::warn!("Failed to update dependencies for {path}: {e}");
                false
            }
        }
    }

    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).await
    }

    pub async fn query(&self, embedding: &[f32], n: usize) -> Vec<QueryMatch> {
        if n == 0 {
            return Vec::new();
        }
        match self.backend.query(embedding, n).await {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Query failed: {e}");
                Vec::new()
            }
        }
    }

    pub async fn get(&self, filter: &MetadataFilter) -> Vec<DocumentRecord> {
        match self.backend.get(filter).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Failed to read records: {e}");
                Vec::new()
            }
        }
    }

    /// File record of `path`, if indexed
    pub async fn file_record(&self, path: &str) -> Option<DocumentRecord> {
        self.get(&MetadataFilter::by_file(path).with_kind(ChunkKind::File))
            .await
            .into_iter()
            .next()
    }

    pub async fn count(&self) -> usize {
        match self.backend.count().await {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Count failed: {e}");
                0
            }
        }
    }

    pub async fn get_stats(&self) -> StoreStats {
        let records = self.get(&MetadataFilter::all()).await;

        let files: BTreeSet<&str> = records.iter().map(|r| r.metadata.file.as_str()).collect();
        let total_functions = records
            .iter()
            .filter(|r| r.metadata.kind.is_symbol())
            .count();
        let total_dependencies = records
            .iter()
            .map(|r| r.metadata.imports.len() + r.metadata.exports.len())
            .sum();

        StoreStats {
            total_items: records.len(),
            total_files: files.len(),
            total_functions,
            total_dependencies,
        }
    }

    /// Flush buffered writes to disk.
    pub async fn persist(&mut self) -> Result<()> {
        self.backend.persist().await
    }

    /// Drop the whole collection; later writes recreate it.
    pub async fn reset(&mut self) -> Result<()> {
        log::info!("Resetting store");
        self.backend.drop_collection().await
    }
}

/// Text that gets embedded and stored for `chunk`.
#[must_use]
pub fn document_text(chunk: &CodeChunk) -> String {
    match chunk.kind {
        ChunkKind::File => format!("File: {}\nPath: {}\n{}", chunk.name, chunk.path, chunk.content),
        kind => format!("{kind}: {}\nFile: {}\n{}", chunk.name, chunk.path, chunk.content),
    }
}
