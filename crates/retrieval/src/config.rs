use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Items per list when the caller does not ask for a size
    pub top_k: usize,
    /// Results for `search_similar_code` when unspecified
    pub search_top_k: usize,
    /// Diff lines folded into the query text
    pub max_diff_lines: usize,
    /// Neighbours fetched per requested item before filtering
    pub candidate_factor: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            search_top_k: 5,
            max_diff_lines: 10,
            candidate_factor: 3,
        }
    }
}
