use anyhow::{Context as AnyhowContext, Result};
use rag_indexer::IndexerConfig;
use rag_retrieval::RetrieverConfig;
use rag_vector_store::paths::db_dir_for_root;
use rag_vector_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the repository root when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "review-rag.toml";

/// Settings for every component, as read from `review-rag.toml`:
///
/// ```toml
/// [store]
/// persist_dir = ".review-rag"
/// embedding = { mode = "hashed", dimension = 384 }
///
/// [indexer]
/// max_file_size = 1048576
///
/// [retriever]
/// top_k = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub store: StoreConfig,
    pub indexer: IndexerConfig,
    pub retriever: RetrieverConfig,
}

impl RagConfig {
    /// Read `explicit`, or `review-rag.toml` under `root` if present.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Anchor the store directory at `root` and keep it out of the scan.
    pub fn resolve_db_dir(&mut self, root: &Path) -> PathBuf {
        let db_dir = db_dir_for_root(root, &self.store.persist_dir);
        if let Ok(inside) = db_dir.strip_prefix(root) {
            if let Some(first) = inside.components().next() {
                let name = first.as_os_str().to_string_lossy().to_string();
                self.indexer = std::mem::take(&mut self.indexer).ignoring_dir(name);
            }
        }
        self.store.persist_dir = db_dir.clone();
        db_dir
    }
}
