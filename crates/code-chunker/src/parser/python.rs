use super::{slice_lines, LanguageParser, ParseOutput, ParsedChunk};
use crate::error::{ChunkerError, Result};
use crate::types::ChunkKind;
use std::collections::VecDeque;
use tree_sitter::{Node, Parser};

/// Tree-sitter based parser for Python sources.
///
/// Every `def` and `class` in the file becomes a chunk, including methods and
/// nested definitions. Public names (no leading underscore) are exported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonParser;

impl LanguageParser for PythonParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParseOutput> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ChunkerError::parse(format!("Failed to parse {path}")))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ChunkerError::parse(format!("Syntax error in {path}")));
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let mut output = ParseOutput::default();

        // Breadth-first so outer definitions come before their members.
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            match node.kind() {
                "import_statement" => collect_import_names(node, content, &mut output.imports),
                "import_from_statement" => {
                    if let Some(module) = from_module(node, content) {
                        output.imports.push(module);
                    }
                }
                "future_import_statement" => output.imports.push("__future__".to_string()),
                "function_definition" => {
                    push_definition(node, ChunkKind::Function, content, &lines, &mut output);
                }
                "class_definition" => {
                    push_definition(node, ChunkKind::Class, content, &lines, &mut output);
                }
                _ => {}
            }

            let mut cursor = node.walk();
            queue.extend(node.named_children(&mut cursor));
        }

        Ok(output)
    }
}

fn push_definition(
    node: Node,
    kind: ChunkKind,
    content: &str,
    lines: &[&str],
    output: &mut ParseOutput,
) {
    let Some(name) = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(content.as_bytes()).ok())
    else {
        return;
    };

    let line_start = node.start_position().row + 1;
    let line_end = node.end_position().row + 1;

    if !name.starts_with('_') {
        output.exports.push(name.to_string());
    }
    output.chunks.push(ParsedChunk {
        kind,
        name: name.to_string(),
        content: slice_lines(lines, line_start, line_end),
        line_start,
        line_end,
    });
}

/// `import a.b, c as d` yields `a.b` and `c`.
fn collect_import_names(node: Node, content: &str, imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        let target = if child.kind() == "aliased_import" {
            child.child_by_field_name("name")
        } else {
            Some(child)
        };
        if let Some(text) = target.and_then(|n| n.utf8_text(content.as_bytes()).ok()) {
            imports.push(text.to_string());
        }
    }
}

/// Module of a `from X import ...` statement with relative dots removed.
/// A bare `from . import x` names no module and yields nothing.
fn from_module(node: Node, content: &str) -> Option<String> {
    let text = node
        .child_by_field_name("module_name")?
        .utf8_text(content.as_bytes())
        .ok()?;
    let module = text.trim_start_matches('.');
    (!module.is_empty()).then(|| module.to_string())
}
