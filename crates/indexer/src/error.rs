use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] rag_vector_store::VectorStoreError),

    #[error("Dependency graph error: {0}")]
    GraphError(#[from] rag_graph::GraphError),

    #[error("Git error: {0}")]
    GitError(String),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),
}
