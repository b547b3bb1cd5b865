use crate::document_store::DocumentStore;
use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use crate::paths::collection_path;
use crate::types::{ChunkMetadata, DocumentRecord, MetadataFilter, QueryMatch, StoredDocument};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const COLLECTION_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCollection {
    schema_version: u32,
    dimension: usize,
    documents: BTreeMap<String, StoredDocument>,
}

/// Document store kept in memory and persisted as one JSON file
pub struct JsonDocumentStore {
    path: PathBuf,
    documents: BTreeMap<String, StoredDocument>,
    index: FlatIndex,
    dirty: bool,
}

impl JsonDocumentStore {
    /// Open the collection under `persist_dir`, loading it if present.
    pub async fn open(persist_dir: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let path = collection_path(persist_dir.as_ref());
        let mut store = Self {
            path,
            documents: BTreeMap::new(),
            index: FlatIndex::new(dimension),
            dirty: false,
        };

        if tokio::fs::try_exists(&store.path).await? {
            store.load().await?;
        } else {
            log::debug!("No collection at {}, starting empty", store.path.display());
        }
        Ok(store)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&mut self) -> Result<()> {
        log::info!("Loading collection from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        let persisted: PersistedCollection = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != COLLECTION_SCHEMA_VERSION {
            return Err(VectorStoreError::IndexError(format!(
                "Unsupported collection schema_version {} (expected {COLLECTION_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        if persisted.dimension != self.index.dimension() {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.index.dimension(),
                actual: persisted.dimension,
            });
        }

        for (id, doc) in &persisted.documents {
            self.index.add(id, &doc.embedding)?;
        }
        self.documents = persisted.documents;
        log::info!("Loaded {} documents", self.documents.len());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn upsert(&mut self, doc: StoredDocument) -> Result<()> {
        self.index.add(&doc.id, &doc.embedding)?;
        self.documents.insert(doc.id.clone(), doc);
        self.dirty = true;
        Ok(())
    }

    async fn get(&self, filter: &MetadataFilter) -> Result<Vec<DocumentRecord>> {
        Ok(self
            .documents
            .values()
            .filter(|doc| filter.matches(&doc.metadata))
            .map(|doc| DocumentRecord {
                id: doc.id.clone(),
                document: doc.document.clone(),
                metadata: doc.metadata.clone(),
            })
            .collect())
    }

    async fn update_metadata(&mut self, id: &str, metadata: ChunkMetadata) -> Result<bool> {
        let Some(doc) = self.documents.get_mut(id) else {
            return Ok(false);
        };
        doc.metadata = metadata;
        self.dirty = true;
        Ok(true)
    }

    async fn delete(&mut self, ids: &[String]) -> Result<usize> {
        let mut removed = 0;
        for id in ids {
            if self.documents.remove(id).is_some() {
                self.index.remove(id);
                removed += 1;
            }
        }
        if removed > 0 {
            self.dirty = true;
        }
        Ok(removed)
    }

    async fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<QueryMatch>> {
        let neighbors = self.index.search(embedding, n)?;
        Ok(neighbors
            .into_iter()
            .filter_map(|(id, similarity)| {
                self.documents.get(&id).map(|doc| QueryMatch {
                    id,
                    document: doc.document.clone(),
                    metadata: doc.metadata.clone(),
                    distance: 1.0 - similarity,
                })
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    async fn persist(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedCollection {
            schema_version: COLLECTION_SCHEMA_VERSION,
            dimension: self.index.dimension(),
            documents: self.documents.clone(),
        };
        let bytes = serde_json::to_vec(&persisted)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        self.dirty = false;
        log::debug!(
            "Persisted {} documents to {}",
            self.documents.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn drop_collection(&mut self) -> Result<()> {
        self.documents.clear();
        self.index.clear();
        self.dirty = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                log::info!("Dropped collection at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_code_chunker::ChunkKind;
    use tempfile::TempDir;

    fn doc(id: &str, file: &str, kind: ChunkKind, embedding: Vec<f32>) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            document: format!("doc {id}"),
            embedding,
            metadata: ChunkMetadata {
                kind,
                file: file.to_string(),
                name: id.to_string(),
                language: "python".to_string(),
                line_start: 1,
                line_end: 2,
                imports: vec![],
                exports: vec![],
                parent_file: None,
                last_modified: "2024-01-01T00:00:00Z".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn persist_and_reload() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        store
            .upsert(doc("file:a.py", "a.py", ChunkKind::File, vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(doc("f1", "a.py", ChunkKind::Function, vec![0.0, 1.0]))
            .await
            .unwrap();
        store.persist().await.unwrap();

        let reloaded = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        assert_eq!(reloaded.count().await.unwrap(), 2);

        let hits = reloaded.query(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(hits[0].id, "f1");
        assert!(hits[0].distance.abs() < 1e-6);
    }

    #[tokio::test]
    async fn unpersisted_changes_are_not_on_disk() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        store
            .upsert(doc("x", "a.py", ChunkKind::File, vec![1.0, 0.0]))
            .await
            .unwrap();

        assert!(!store.path().exists());
        let reloaded = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        assert_eq!(reloaded.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn dimension_mismatch_on_open_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        store
            .upsert(doc("x", "a.py", ChunkKind::File, vec![1.0, 0.0]))
            .await
            .unwrap();
        store.persist().await.unwrap();

        let result = JsonDocumentStore::open(tmp.path(), 3).await;
        assert!(matches!(
            result,
            Err(VectorStoreError::InvalidDimension { expected: 3, actual: 2 })
        ));
    }

    #[tokio::test]
    async fn filter_delete_and_update() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        store
            .upsert(doc("file:a.py", "a.py", ChunkKind::File, vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(doc("f1", "a.py", ChunkKind::Function, vec![0.0, 1.0]))
            .await
            .unwrap();
        store
            .upsert(doc("file:b.py", "b.py", ChunkKind::File, vec![1.0, 1.0]))
            .await
            .unwrap();

        let a_docs = store.get(&MetadataFilter::by_file("a.py")).await.unwrap();
        assert_eq!(a_docs.len(), 2);

        let mut meta = a_docs[0].metadata.clone();
        meta.imports = vec!["os".to_string()];
        assert!(store.update_metadata("file:a.py", meta).await.unwrap());
        assert!(!store
            .update_metadata("missing", a_docs[0].metadata.clone())
            .await
            .unwrap());

        let ids: Vec<String> = a_docs.into_iter().map(|d| d.id).collect();
        assert_eq!(store.delete(&ids).await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.query(&[1.0, 0.0], 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drop_then_recreate_lazily() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonDocumentStore::open(tmp.path(), 2).await.unwrap();
        store
            .upsert(doc("x", "a.py", ChunkKind::File, vec![1.0, 0.0]))
            .await
            .unwrap();
        store.persist().await.unwrap();

        store.drop_collection().await.unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.count().await.unwrap(), 0);

        store
            .upsert(doc("y", "b.py", ChunkKind::File, vec![0.0, 1.0]))
            .await
            .unwrap();
        store.persist().await.unwrap();
        assert!(store.path().exists());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
