//! Best-effort matching of import strings against indexed file paths.
//!
//! No resolver configuration is consulted: an import matches a file when it
//! names the file directly, its extension-less path, or a dotted/slashed
//! tail of it. Relative specifiers (`./x`, `../x`) are resolved against the
//! importing file's directory and must match exactly.

const INDEX_STEMS: &[&str] = &["__init__", "index"];

/// Does `import`, written in `importer`, refer to the file at `key`?
pub(crate) fn import_matches(key: &str, import: &str, importer: &str) -> bool {
    if key == import {
        return true;
    }

    let Some(target) = import_target(import, importer) else {
        return false;
    };
    let relative = import.starts_with('.') && import.contains('/');

    module_stems(key).iter().any(|stem| {
        stem == &target || (!relative && stem.ends_with(&format!("/{target}")))
    })
}

/// Slash-separated, extension-less module path named by `import`.
fn import_target(import: &str, importer: &str) -> Option<String> {
    let import = import.trim();
    if import.is_empty() {
        return None;
    }

    if import.starts_with('.') && import.contains('/') {
        let base = importer.rsplit_once('/').map_or("", |(dir, _)| dir);
        return normalize(&format!("{base}/{import}"));
    }

    let slashed = if import.contains('/') {
        import.to_string()
    } else {
        import.replace('.', "/")
    };
    normalize(slashed.trim_start_matches('@'))
}

/// Module names a file can be imported under: its extension-less path and,
/// for package index files, the containing directory.
fn module_stems(key: &str) -> Vec<String> {
    let file_start = key.rfind('/').map_or(0, |i| i + 1);
    let stem = match key[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &key[..file_start + dot],
        _ => key,
    };
    let mut stems = vec![stem.to_string()];

    if let Some((dir, file)) = stem.rsplit_once('/') {
        if INDEX_STEMS.contains(&file) {
            stems.push(dir.to_string());
        }
    }
    stems
}

/// Collapse `.` and `..` segments; `None` if the path escapes the root.
fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}
