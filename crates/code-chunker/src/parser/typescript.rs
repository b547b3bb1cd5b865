use super::{slice_lines, LanguageParser, ParseOutput, ParsedChunk};
use crate::error::Result;
use crate::language::Language;
use crate::types::ChunkKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Chunks longer than this are cut and marked as truncated.
const MAX_CHUNK_LINES: usize = 100;
/// Span assumed when no closing brace is found.
const UNCLOSED_SPAN_LINES: usize = 30;
const TRUNCATION_MARKER: &str = "// ... (truncated)";

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:(?:\*\s+as\s+\w+)|(?:\{[^}]+\})|(?:\w+))\s+from\s+['"]([^'"]+)['"]"#)
        .expect("valid import regex")
});
static EXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:function|const|class|interface|type)\s+(\w+)")
        .expect("valid export regex")
});
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\([^)]*\)\s*(?::\s*[^{]+)?\s*\{")
        .expect("valid function regex")
});
static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:export\s+)?const\s+(\w+)\s*=\s*(?:\([^)]*\)|[^=]+)\s*=>\s*")
        .expect("valid arrow function regex")
});
static COMPONENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:export\s+)?(?:const|function)\s+([A-Z]\w+)\s*[=:]")
        .expect("valid component regex")
});
static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:export\s+)?class\s+(\w+)").expect("valid class regex"));

/// Pattern-based parser shared by JavaScript and TypeScript (incl. JSX/TSX).
///
/// Spans are found by brace counting from the declaration line.
#[derive(Debug, Clone, Copy)]
pub struct ScriptParser {
    language: Language,
}

impl ScriptParser {
    #[must_use]
    pub const fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }

    #[must_use]
    pub const fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }
}

impl LanguageParser for ScriptParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParseOutput> {
        let lines: Vec<&str> = content.split('\n').collect();

        let imports = IMPORT_RE
            .captures_iter(content)
            .filter_map(|c| first_group(&c))
            .collect();
        let exports = EXPORT_RE
            .captures_iter(content)
            .filter_map(|c| first_group(&c))
            .collect();

        // Later passes win when two patterns hit the same declaration, so an
        // arrow function that is also a component ends up as a component.
        let passes: [(&Regex, ChunkKind); 4] = [
            (&FUNCTION_RE, ChunkKind::Function),
            (&ARROW_RE, ChunkKind::Function),
            (&COMPONENT_RE, ChunkKind::Component),
            (&CLASS_RE, ChunkKind::Class),
        ];

        let mut chunks: Vec<ParsedChunk> = Vec::new();
        let mut seen: HashMap<(String, usize), usize> = HashMap::new();
        for (re, kind) in passes {
            for caps in re.captures_iter(content) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let chunk = chunk_at(content, &lines, whole.start(), name.as_str(), kind);
                match seen.get(&(chunk.name.clone(), chunk.line_start)) {
                    Some(&idx) => chunks[idx] = chunk,
                    None => {
                        seen.insert((chunk.name.clone(), chunk.line_start), chunks.len());
                        chunks.push(chunk);
                    }
                }
            }
        }

        log::trace!(
            "{} parser: {} symbols in {path}",
            self.language.as_str(),
            chunks.len()
        );

        Ok(ParseOutput {
            chunks,
            imports,
            exports,
        })
    }
}

fn first_group(caps: &Captures<'_>) -> Option<String> {
    caps.get(1).map(|m| m.as_str().to_string())
}

fn chunk_at(
    content: &str,
    lines: &[&str],
    offset: usize,
    name: &str,
    kind: ChunkKind,
) -> ParsedChunk {
    let line_start = content[..offset].matches('\n').count() + 1;
    let mut line_end = closing_line(lines, line_start);

    let text = if line_end - line_start > MAX_CHUNK_LINES {
        line_end = line_start + MAX_CHUNK_LINES;
        format!(
            "{}\n{TRUNCATION_MARKER}",
            slice_lines(lines, line_start, line_end)
        )
    } else {
        slice_lines(lines, line_start, line_end)
    };

    ParsedChunk {
        kind,
        name: name.to_string(),
        content: text,
        line_start,
        line_end,
    }
}

/// 1-indexed line holding the brace that closes the first block opened at or
/// after `line_start`.
fn closing_line(lines: &[&str], line_start: usize) -> usize {
    let mut depth: i64 = 0;
    let mut opened = false;

    for (idx, line) in lines.iter().enumerate().skip(line_start - 1) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => {
                    depth -= 1;
                    if opened && depth == 0 {
                        return idx + 1;
                    }
                }
                _ => {}
            }
        }
    }

    (line_start + UNCLOSED_SPAN_LINES - 1)
        .min(lines.len())
        .max(line_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"import React from 'react';
import { useState } from "react";
import * as utils from './utils';

export function formatDate(d: Date): string {
  return d.toISOString();
}

export const add = (a: number, b: number) => {
  return a + b;
};

export const Button = (props: Props) => {
  return <button>{props.label}</button>;
};

export class Store {
  items = [];
}
"#;

    fn summary(out: &ParseOutput) -> Vec<(ChunkKind, &str, usize, usize)> {
        out.chunks
            .iter()
            .map(|c| (c.kind, c.name.as_str(), c.line_start, c.line_end))
            .collect()
    }

    #[test]
    fn extracts_imports_and_exports() {
        let out = ScriptParser::typescript().parse("a.tsx", SAMPLE).unwrap();
        assert_eq!(out.imports, vec!["react", "react", "./utils"]);
        assert_eq!(out.exports, vec!["formatDate", "add", "Button", "Store"]);
    }

    #[test]
    fn extracts_symbols_with_brace_spans() {
        let out = ScriptParser::typescript().parse("a.tsx", SAMPLE).unwrap();
        assert_eq!(
            summary(&out),
            vec![
                (ChunkKind::Function, "formatDate", 5, 7),
                (ChunkKind::Function, "add", 9, 11),
                (ChunkKind::Component, "Button", 13, 15),
                (ChunkKind::Class, "Store", 17, 19),
            ]
        );
        assert_eq!(
            out.chunks[1].content,
            "export const add = (a: number, b: number) => {\n  return a + b;\n};"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let mut src = String::from("function big() {\n");
        for _ in 0..150 {
            src.push_str("  step();\n");
        }
        src.push_str("}\n");

        let out = ScriptParser::javascript().parse("big.js", &src).unwrap();
        let chunk = &out.chunks[0];
        assert_eq!((chunk.line_start, chunk.line_end), (1, 101));
        assert!(chunk.content.ends_with("\n// ... (truncated)"));
        assert_eq!(chunk.content.lines().count(), 102);
    }

    #[test]
    fn unclosed_block_falls_back_to_fixed_span() {
        let mut src = String::from("function open() {\n");
        for _ in 0..40 {
            src.push_str("  step();\n");
        }

        let out = ScriptParser::javascript().parse("open.js", &src).unwrap();
        assert_eq!((out.chunks[0].line_start, out.chunks[0].line_end), (1, 30));
    }

    #[test]
    fn unclosed_block_is_clamped_to_file_length() {
        let out = ScriptParser::javascript()
            .parse("short.js", "function open() {\n  step();")
            .unwrap();
        assert_eq!((out.chunks[0].line_start, out.chunks[0].line_end), (1, 2));
    }

    #[test]
    fn plain_script_without_symbols() {
        let out = ScriptParser::javascript()
            .parse("plain.js", "console.log('hi');\n")
            .unwrap();
        assert_eq!(out, ParseOutput::default());
    }
}
