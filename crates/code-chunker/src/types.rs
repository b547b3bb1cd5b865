use crate::error::{ChunkerError, Result};
use crate::id::{file_chunk_id, generate_id};
use crate::parser::ParsedChunk;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity of an indexed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    /// Whole source file
    File,
    /// Function or method
    Function,
    /// Class definition
    Class,
    /// UI component (capitalised JS/TS declaration)
    Component,
}

impl ChunkKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Function => "function",
            Self::Class => "class",
            Self::Component => "component",
        }
    }

    /// Symbol-level kinds are the ones that live under a file chunk.
    #[must_use]
    pub const fn is_symbol(self) -> bool {
        matches!(self, Self::Function | Self::Class | Self::Component)
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkKind {
    type Err = ChunkerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "function" => Ok(Self::Function),
            "class" => Ok(Self::Class),
            "component" => Ok(Self::Component),
            other => Err(ChunkerError::UnknownKind(other.to_string())),
        }
    }
}

/// One indexed unit of code with its identity and span
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeChunk {
    /// Stable id, see [`generate_id`]
    pub id: String,

    pub kind: ChunkKind,

    /// Repository-relative path with `/` separators
    pub path: String,

    /// File name for file chunks, symbol identifier otherwise
    pub name: String,

    /// Raw source text of the span
    pub content: String,

    pub language: String,

    /// Start line (1-indexed)
    pub line_start: usize,

    /// End line (1-indexed, inclusive)
    pub line_end: usize,

    #[serde(default)]
    pub imports: Vec<String>,

    #[serde(default)]
    pub exports: Vec<String>,

    /// Id of the owning file chunk; `None` for file chunks
    #[serde(default)]
    pub parent_file: Option<String>,

    /// RFC 3339 timestamp set at indexing time
    pub last_modified: String,
}

impl CodeChunk {
    /// Build the file-level chunk for `path`.
    #[must_use]
    pub fn file(
        path: impl Into<String>,
        content: impl Into<String>,
        language: impl Into<String>,
        imports: Vec<String>,
        exports: Vec<String>,
        last_modified: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let content = content.into();
        let name = path.rsplit('/').next().unwrap_or(path.as_str()).to_string();
        let line_end = content.lines().count().max(1);

        Self {
            id: file_chunk_id(&path),
            kind: ChunkKind::File,
            name,
            content,
            language: language.into(),
            line_start: 1,
            line_end,
            imports,
            exports,
            parent_file: None,
            last_modified: last_modified.into(),
            path,
        }
    }

    /// Build a function/class/component chunk from parser output.
    pub fn symbol(
        parsed: ParsedChunk,
        path: impl Into<String>,
        language: impl Into<String>,
        last_modified: impl Into<String>,
    ) -> Result<Self> {
        if !parsed.kind.is_symbol() {
            return Err(ChunkerError::parse(format!(
                "parser produced a '{}' chunk for symbol '{}'",
                parsed.kind, parsed.name
            )));
        }
        if parsed.line_start == 0 || parsed.line_end < parsed.line_start {
            return Err(ChunkerError::InvalidBoundaries {
                start: parsed.line_start,
                end: parsed.line_end,
            });
        }

        let path = path.into();
        Ok(Self {
            id: generate_id(parsed.kind, &path, &parsed.name, parsed.line_start),
            kind: parsed.kind,
            name: parsed.name,
            content: parsed.content,
            language: language.into(),
            line_start: parsed.line_start,
            line_end: parsed.line_end,
            imports: Vec::new(),
            exports: Vec::new(),
            parent_file: Some(file_chunk_id(&path)),
            last_modified: last_modified.into(),
            path,
        })
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_end.saturating_sub(self.line_start) + 1
    }
}
