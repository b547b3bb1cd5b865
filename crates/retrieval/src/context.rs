use rag_code_chunker::ChunkKind;
use rag_graph::Dependencies;
use serde::Serialize;

/// A whole-file neighbour of the file under review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarFile {
    pub path: String,
    pub name: String,
    /// Stored document text
    pub content: String,
    pub relevance: f32,
}

/// A function, class or component from another file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedFunction {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub path: String,
    pub content: String,
    pub relevance: f32,
}

/// Everything retrieved for one changed file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalContext {
    pub similar_files: Vec<SimilarFile>,
    pub related_functions: Vec<RelatedFunction>,
    pub dependencies: Dependencies,
}

impl RetrievalContext {
    /// Whether any list or dependency entry is non-empty
    #[must_use]
    pub fn has_context(&self) -> bool {
        !self.similar_files.is_empty()
            || !self.related_functions.is_empty()
            || !self.dependencies.is_empty()
    }
}

/// Flat hit returned by snippet search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarCode {
    pub file: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub content: String,
    pub similarity: f32,
}
