//! # RAG Code Chunker
//!
//! Chunk model and per-language parsing for the review retrieval index.
//!
//! ## Chunk levels
//!
//! ```text
//! Source file
//!     │
//!     ├──> file chunk        id = "file:{path}"
//!     │      └─ imports / exports
//!     │
//!     └──> symbol chunks     id = sha256(kind:path:name:line)
//!            ├─ function
//!            ├─ class
//!            └─ component
//! ```
//!
//! Parsers only report kind, name, span and source text. Identity, paths,
//! languages and timestamps are filled in by [`CodeChunk::file`] and
//! [`CodeChunk::symbol`].
//!
//! ## Example
//!
//! ```rust
//! use rag_code_chunker::{parser_for, Language};
//!
//! let parser = parser_for(Language::Python).unwrap();
//! let output = parser.parse("app.py", "def handler():\n    pass\n").unwrap();
//! assert_eq!(output.exports, vec!["handler".to_string()]);
//! ```

mod error;
mod id;
mod language;
mod parser;
mod types;

pub use error::{ChunkerError, Result};
pub use id::{file_chunk_id, generate_id, FILE_ID_PREFIX};
pub use language::{Language, SUPPORTED_EXTENSIONS};
pub use parser::{parser_for, LanguageParser, ParseOutput, ParsedChunk, PythonParser, ScriptParser};
pub use types::{ChunkKind, CodeChunk};
