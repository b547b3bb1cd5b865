use rag_vector_store::paths::DEFAULT_DB_DIR_NAME;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576; // 1 MB
pub const DEFAULT_PERSIST_EVERY: usize = 100;

const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    "__pycache__",
    ".next",
    ".nuxt",
    "venv",
    "env",
    ".venv",
    "coverage",
    ".pytest_cache",
    ".mypy_cache",
    DEFAULT_DB_DIR_NAME,
];

const DEFAULT_IGNORE_SUFFIXES: &[&str] = &[
    ".pyc",
    ".map",
    ".min.js",
    ".bundle.js",
    "package-lock.json",
    "yarn.lock",
    "poetry.lock",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directory names skipped anywhere in the tree
    pub ignore_dirs: Vec<String>,
    /// File name endings that are never indexed
    pub ignore_suffixes: Vec<String>,
    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,
    /// Also honour `.gitignore` and friends while walking
    pub respect_gitignore: bool,
    /// Flush the store after this many files during a run
    pub persist_every: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(ToString::to_string).collect(),
            ignore_suffixes: DEFAULT_IGNORE_SUFFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            respect_gitignore: false,
            persist_every: DEFAULT_PERSIST_EVERY,
        }
    }
}

impl IndexerConfig {
    /// Add a directory name to the ignore list (e.g. a custom store directory)
    #[must_use]
    pub fn ignoring_dir(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.ignore_dirs.contains(&name) {
            self.ignore_dirs.push(name);
        }
        self
    }

    #[must_use]
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.iter().any(|dir| dir == name)
    }

    #[must_use]
    pub fn is_ignored_file(&self, file_name: &str) -> bool {
        self.ignore_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}
