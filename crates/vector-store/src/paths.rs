use std::path::{Path, PathBuf};

/// Store directory created under the repository root unless configured
pub const DEFAULT_DB_DIR_NAME: &str = ".review-rag";

pub const COLLECTION_FILE_NAME: &str = "collection.json";
pub const DEPENDENCY_GRAPH_FILE_NAME: &str = "dependencies.json";

#[must_use]
pub fn collection_path(db_dir: &Path) -> PathBuf {
    db_dir.join(COLLECTION_FILE_NAME)
}

#[must_use]
pub fn dependency_graph_path(db_dir: &Path) -> PathBuf {
    db_dir.join(DEPENDENCY_GRAPH_FILE_NAME)
}

/// Resolve a configured store directory against the repository root.
#[must_use]
pub fn db_dir_for_root(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
