use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] rag_vector_store::VectorStoreError),

    #[error("Empty query")]
    EmptyQuery,
}
