use crate::embeddings::{EmbeddingMode, DEFAULT_DIMENSION};
use crate::error::Result;
use crate::paths::DEFAULT_DB_DIR_NAME;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the collection and the dependency graph
    pub persist_dir: PathBuf,
    pub embedding: EmbeddingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persist_dir: PathBuf::from(DEFAULT_DB_DIR_NAME),
            embedding: EmbeddingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Falls back to `RAG_EMBEDDING_MODE`, then `hashed`
    pub mode: Option<EmbeddingMode>,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: None,
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    pub fn resolve_mode(&self) -> Result<EmbeddingMode> {
        match self.mode {
            Some(mode) => Ok(mode),
            None => EmbeddingMode::from_env(),
        }
    }
}
