//! Per-language extraction of symbols, imports and exports.

mod python;
mod typescript;

pub use python::PythonParser;
pub use typescript::ScriptParser;

use crate::error::Result;
use crate::language::Language;
use crate::types::ChunkKind;

/// A symbol found by a parser, before identity is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChunk {
    pub kind: ChunkKind,
    pub name: String,
    pub content: String,
    /// 1-indexed
    pub line_start: usize,
    /// 1-indexed, inclusive
    pub line_end: usize,
}

/// Everything a parser extracts from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub chunks: Vec<ParsedChunk>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

pub trait LanguageParser: Send + Sync {
    /// Extract symbol chunks plus the file's imports and exports.
    ///
    /// `path` is only used for diagnostics.
    fn parse(&self, path: &str, content: &str) -> Result<ParseOutput>;
}

/// Parser for `language`, or `None` when the language is not indexed.
#[must_use]
pub fn parser_for(language: Language) -> Option<Box<dyn LanguageParser>> {
    match language {
        Language::Python => Some(Box::new(PythonParser)),
        Language::JavaScript => Some(Box::new(ScriptParser::javascript())),
        Language::TypeScript => Some(Box::new(ScriptParser::typescript())),
        Language::Unknown => None,
    }
}

/// Lines `start..=end` (1-indexed) of `lines`, clamped to what exists.
pub(crate) fn slice_lines(lines: &[&str], start: usize, end: usize) -> String {
    let from = start.saturating_sub(1).min(lines.len());
    let to = end.min(lines.len()).max(from);
    lines[from..to].join("\n")
}
