use rag_code_chunker::{ChunkKind, CodeChunk};
use serde::{Deserialize, Serialize};

/// Typed metadata stored next to every document.
///
/// `file` and `type` are the keys filters match on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub file: String,
    pub name: String,
    pub language: String,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub parent_file: Option<String>,
    pub last_modified: String,
}

impl From<&CodeChunk> for ChunkMetadata {
    fn from(chunk: &CodeChunk) -> Self {
        Self {
            kind: chunk.kind,
            file: chunk.path.clone(),
            name: chunk.name.clone(),
            language: chunk.language.clone(),
            line_start: chunk.line_start,
            line_end: chunk.line_end,
            imports: chunk.imports.clone(),
            exports: chunk.exports.clone(),
            parent_file: chunk.parent_file.clone(),
            last_modified: chunk.last_modified.clone(),
        }
    }
}

/// Persisted record: document text, embedding and metadata under one id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A stored record without its embedding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRecord {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
}

/// One nearest-neighbour hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    /// Cosine distance in `[0, 2]`, 0 = identical
    pub distance: f32,
}

impl QueryMatch {
    /// `1 - distance`; may be negative
    #[must_use]
    pub fn relevance(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Equality filter on metadata; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub file: Option<String>,
    pub kind: Option<ChunkKind>,
}

impl MetadataFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn by_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            kind: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ChunkKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        self.file.as_deref().map_or(true, |f| f == metadata.file)
            && self.kind.map_or(true, |k| k == metadata.kind)
    }
}

/// Aggregate counts over the whole collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_items: usize,
    /// Distinct `file` values
    pub total_files: usize,
    /// Function, class and component records
    pub total_functions: usize,
    /// Sum of import and export list lengths over all records
    pub total_dependencies: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(file: &str, kind: ChunkKind) -> ChunkMetadata {
        ChunkMetadata {
            kind,
            file: file.to_string(),
            name: "x".to_string(),
            language: "python".to_string(),
            line_start: 1,
            line_end: 1,
            imports: vec![],
            exports: vec![],
            parent_file: None,
            last_modified: String::new(),
        }
    }

    #[test]
    fn filter_matching() {
        let meta = metadata("a.py", ChunkKind::Function);
        assert!(MetadataFilter::all().matches(&meta));
        assert!(MetadataFilter::by_file("a.py").matches(&meta));
        assert!(!MetadataFilter::by_file("b.py").matches(&meta));
        assert!(MetadataFilter::by_file("a.py")
            .with_kind(ChunkKind::Function)
            .matches(&meta));
        assert!(!MetadataFilter::by_file("a.py")
            .with_kind(ChunkKind::File)
            .matches(&meta));
    }

    #[test]
    fn metadata_serializes_kind_as_type() {
        let json = serde_json::to_value(metadata("a.py", ChunkKind::Class)).unwrap();
        assert_eq!(json["type"], "class");
        assert_eq!(json["file"], "a.py");
    }

    #[test]
    fn relevance_is_not_clamped() {
        let m = QueryMatch {
            id: "x".to_string(),
            document: String::new(),
            metadata: metadata("a.py", ChunkKind::File),
            distance: 1.25,
        };
        assert!((m.relevance() + 0.25).abs() < 1e-6);
    }
}
