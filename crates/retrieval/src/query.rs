use std::path::Path;

const DIFF_HEADER_PREFIXES: &[&str] = &["@@", "---", "+++", "diff"];

/// Query text for a changed file, optionally enriched with its diff.
///
/// ```text
/// file: src/app.py
/// extension: .py
/// code: <first diff body lines joined by spaces>
/// ```
#[must_use]
pub fn build_query(filepath: &str, diff: Option<&str>, max_diff_lines: usize) -> String {
    let mut query = format!("file: {filepath}\nextension: {}", extension(filepath));

    if let Some(diff) = diff.filter(|d| !d.is_empty()) {
        let lines: Vec<&str> = diff
            .split('\n')
            .filter(|line| !DIFF_HEADER_PREFIXES.iter().any(|p| line.starts_with(p)))
            .take(max_diff_lines)
            .collect();
        if !lines.is_empty() {
            query.push_str("\ncode: ");
            query.push_str(&lines.join(" "));
        }
    }

    query
}

/// Extension with its leading dot, or empty
fn extension(filepath: &str) -> String {
    Path::new(filepath)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
