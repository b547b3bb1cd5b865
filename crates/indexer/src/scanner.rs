use crate::config::IndexerConfig;
use ignore::WalkBuilder;
use rag_code_chunker::Language;
use std::path::{Component, Path, PathBuf};

/// Scanner for finding indexable source files in a project
pub struct FileScanner {
    root: PathBuf,
    config: IndexerConfig,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, config: IndexerConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Scan the tree, returning absolute paths in a stable order
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let filter_config = self.config.clone();
        let respect = self.config.respect_gitignore;
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .ignore(respect)
            .parents(respect)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect);
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && is_ignored_scope(entry.path(), &root, &filter_config))
        });

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > self.config.max_file_size {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                self.config.max_file_size
                            );
                            continue;
                        }
                    }

                    if !self.is_indexable_name(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} source files", files.len());
        files
    }

    /// Whether a repository-relative path passes the ignore rules and has a
    /// supported extension.
    pub fn should_index(&self, relative: &Path) -> bool {
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            if components.peek().is_none() {
                break;
            }
            if let Component::Normal(name) = component {
                if self.config.is_ignored_dir(&name.to_string_lossy()) {
                    return false;
                }
            }
        }
        self.is_indexable_name(relative)
    }

    fn is_indexable_name(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.config.is_ignored_file(name) {
            log::debug!("Skipping ignored file {}", path.display());
            return false;
        }
        Language::from_path(path).is_supported()
    }
}

fn is_ignored_scope(path: &Path, root: &Path, config: &IndexerConfig) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    relative.components().any(|component| match component {
        Component::Normal(name) => config.is_ignored_dir(&name.to_string_lossy()),
        _ => false,
    })
}
