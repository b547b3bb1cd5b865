use crate::config::RetrieverConfig;
use crate::context::{RelatedFunction, RetrievalContext, SimilarCode, SimilarFile};
use crate::error::{RetrievalError, Result};
use crate::query::build_query;
use rag_graph::DependencyGraph;
use rag_vector_store::{ChunkStorage, QueryMatch};
use std::cmp::Ordering;

/// Read-only view over the store and graph answering review-time queries.
///
/// Lookups never fail. Embedding or backend problems are logged and an
/// empty result is returned instead.
pub struct ContextRetriever<'a> {
    storage: &'a ChunkStorage,
    graph: &'a DependencyGraph,
    config: RetrieverConfig,
}

impl<'a> ContextRetriever<'a> {
    pub fn new(storage: &'a ChunkStorage, graph: &'a DependencyGraph) -> Self {
        Self::with_config(storage, graph, RetrieverConfig::default())
    }

    pub fn with_config(
        storage: &'a ChunkStorage,
        graph: &'a DependencyGraph,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            storage,
            graph,
            config,
        }
    }

    /// Similar files, related symbols and dependencies of `filepath`.
    ///
    /// At most `top_k` entries per list (default from config); records of
    /// `filepath` itself are never returned.
    pub async fn get_context(
        &self,
        filepath: &str,
        diff: Option<&str>,
        top_k: Option<usize>,
    ) -> RetrievalContext {
        let top_k = top_k.unwrap_or(self.config.top_k);
        match self.try_get_context(filepath, diff, top_k).await {
            Ok(context) => context,
            Err(e) => {
                log::warn!("Failed to retrieve context for {filepath}: {e}");
                RetrievalContext::default()
            }
        }
    }

    async fn try_get_context(
        &self,
        filepath: &str,
        diff: Option<&str>,
        top_k: usize,
    ) -> Result<RetrievalContext> {
        let count = self.storage.count().await;
        if count == 0 {
            log::debug!("Store is empty, no context for {filepath}");
            return Ok(RetrievalContext::default());
        }
        if diff.map_or(true, str::is_empty) {
            log::debug!("No diff for {filepath}, querying on path only");
        }

        let query = build_query(filepath, diff, self.config.max_diff_lines);
        let embedding = self.storage.encode(&query).await?;
        let n = top_k
            .saturating_mul(self.config.candidate_factor.max(1))
            .min(count);
        let matches = self.storage.query(&embedding, n).await;

        let mut context = RetrievalContext::default();
        for hit in matches {
            if hit.metadata.file == filepath {
                continue;
            }
            let relevance = hit.relevance();
            let QueryMatch {
                document, metadata, ..
            } = hit;
            if metadata.kind.is_symbol() {
                context.related_functions.push(RelatedFunction {
                    name: metadata.name,
                    kind: metadata.kind,
                    path: metadata.file,
                    content: document,
                    relevance,
                });
            } else {
                context.similar_files.push(SimilarFile {
                    path: metadata.file,
                    name: metadata.name,
                    content: document,
                    relevance,
                });
            }
        }

        context
            .similar_files
            .sort_by(|a, b| by_relevance(a.relevance, b.relevance));
        context.similar_files.truncate(top_k);
        context
            .related_functions
            .sort_by(|a, b| by_relevance(a.relevance, b.relevance));
        context.related_functions.truncate(top_k);

        context.dependencies = self.graph.get(filepath);

        log::debug!(
            "Context for {filepath}: {} files, {} symbols",
            context.similar_files.len(),
            context.related_functions.len()
        );
        Ok(context)
    }

    /// Nearest stored records to a free-form code snippet.
    pub async fn search_similar_code(&self, snippet: &str, top_k: Option<usize>) -> Vec<SimilarCode> {
        let top_k = top_k.unwrap_or(self.config.search_top_k);
        match self.try_search(snippet, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                log::warn!("Snippet search failed: {e}");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, snippet: &str, top_k: usize) -> Result<Vec<SimilarCode>> {
        if snippet.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        let count = self.storage.count().await;
        if count == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.storage.encode(snippet).await?;
        let hits = self
            .storage
            .query(&embedding, top_k.min(count))
            .await
            .into_iter()
            .map(|hit| SimilarCode {
                similarity: hit.relevance(),
                file: hit.metadata.file,
                name: hit.metadata.name,
                kind: hit.metadata.kind,
                content: hit.document,
            })
            .collect();
        Ok(hits)
    }
}

/// Descending relevance
fn by_relevance(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
