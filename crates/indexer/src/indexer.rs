use crate::config::IndexerConfig;
use crate::error::{IndexerError, Result};
use crate::scanner::FileScanner;
use crate::stats::{FileOutcome, IndexReport};
use chrono::Utc;
use rag_code_chunker::{parser_for, CodeChunk, Language, ParseOutput};
use rag_graph::DependencyGraph;
use rag_vector_store::ChunkStorage;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

/// Drives full and incremental indexing of one repository.
///
/// Files are processed strictly one after another. Per-file problems are
/// counted in the report; only store persistence failures abort a run.
pub struct CodebaseIndexer<'a> {
    root: PathBuf,
    config: IndexerConfig,
    scanner: FileScanner,
    storage: &'a mut ChunkStorage,
    graph: &'a mut DependencyGraph,
}

impl<'a> CodebaseIndexer<'a> {
    pub fn new(
        root: impl AsRef<Path>,
        config: IndexerConfig,
        storage: &'a mut ChunkStorage,
        graph: &'a mut DependencyGraph,
    ) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            scanner: FileScanner::new(&root, config.clone()),
            root,
            config,
            storage,
            graph,
        })
    }

    /// Index every supported file under the root.
    pub async fn index_all(&mut self) -> Result<IndexReport> {
        let start = Instant::now();
        log::info!("Indexing project at {}", self.root.display());

        let files = self.scanner.scan();
        let mut report = IndexReport {
            total: files.len(),
            ..IndexReport::default()
        };

        for (done, path) in files.iter().enumerate() {
            let relative = self.normalize_path(path);
            self.forget(&relative).await;
            let outcome = self.index_file(path, &relative).await;
            report.record(outcome);
            self.checkpoint(done + 1).await?;
        }

        self.finish(report, start).await
    }

    /// Re-index the given repository-relative (or absolute, under the root)
    /// paths, replacing whatever was stored for them.
    pub async fn index_files(&mut self, paths: &[String]) -> Result<IndexReport> {
        let start = Instant::now();
        log::info!("Incremental indexing of {} files", paths.len());

        let mut report = IndexReport {
            total: paths.len(),
            ..IndexReport::default()
        };

        for (done, raw) in paths.iter().enumerate() {
            let Some(relative) = self.relative_path(raw) else {
                log::warn!("Skipping {raw}: outside {}", self.root.display());
                report.record(FileOutcome::Skipped);
                continue;
            };
            let path = self.root.join(&relative);

            let metadata = match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => meta,
                _ => {
                    log::warn!("File not found: {relative}");
                    report.record(FileOutcome::Skipped);
                    continue;
                }
            };
            if !self.scanner.should_index(Path::new(&relative)) {
                log::info!("Skipping {relative}");
                report.record(FileOutcome::Skipped);
                continue;
            }
            if metadata.len() > self.config.max_file_size {
                log::info!("Skipping large file {relative} ({} bytes)", metadata.len());
                report.record(FileOutcome::Skipped);
                continue;
            }

            self.forget(&relative).await;
            let outcome = self.index_file(&path, &relative).await;
            report.record(outcome);
            self.checkpoint(done + 1).await?;
        }

        self.finish(report, start).await
    }

    /// Drop the stored records and the graph node of `relative`.
    async fn forget(&mut self, relative: &str) {
        let removed = self.storage.delete_by_path(relative).await;
        if let Err(e) = self.graph.remove(relative).await {
            log::warn!("Failed to drop graph node for {relative}: {e}");
        }
        log::debug!("Removed {removed} stale records for {relative}");
    }

    async fn index_file(&mut self, path: &Path, relative: &str) -> FileOutcome {
        let language = Language::from_path(path);
        let Some(parser) = parser_for(language) else {
            log::warn!("Unsupported extension, skipping {relative}");
            return FileOutcome::Skipped;
        };

        let content = match tokio::fs::read(path).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    log::warn!("Skipping {relative}: not valid UTF-8");
                    return FileOutcome::Failed;
                }
            },
            Err(e) => {
                log::warn!("Failed to read {relative}: {e}");
                return FileOutcome::Failed;
            }
        };

        let ParseOutput {
            chunks,
            imports,
            exports,
        } = parser.parse(relative, &content).unwrap_or_else(|e| {
            log::warn!("Failed to parse {relative}, indexing raw file only: {e}");
            ParseOutput::default()
        });

        let timestamp = Utc::now().to_rfc3339();
        let file_chunk = CodeChunk::file(
            relative,
            content,
            language.as_str(),
            imports.clone(),
            exports.clone(),
            timestamp.as_str(),
        );
        if !self.storage.upsert(&file_chunk).await {
            return FileOutcome::Failed;
        }

        let mut stored = 1;
        let mut chunk_errors = 0;
        for parsed in chunks {
            let name = parsed.name.clone();
            match CodeChunk::symbol(parsed, relative, language.as_str(), timestamp.as_str()) {
                Ok(chunk) => {
                    if self.storage.upsert(&chunk).await {
                        stored += 1;
                    } else {
                        chunk_errors += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Dropping chunk {name} in {relative}: {e}");
                    chunk_errors += 1;
                }
            }
        }

        self.storage
            .update_dependencies(relative, &imports, &exports)
            .await;
        if let Err(e) = self.graph.update(relative, imports, exports).await {
            log::warn!("Failed to record dependencies of {relative}: {e}");
        }

        log::debug!("Indexed {relative}: {stored} chunks ({chunk_errors} failed)");
        FileOutcome::Indexed {
            chunks: stored,
            chunk_errors,
        }
    }

    async fn checkpoint(&mut self, done: usize) -> Result<()> {
        if self.config.persist_every > 0 && done % self.config.persist_every == 0 {
            log::debug!("Persisting store after {done} files");
            self.storage.persist().await?;
        }
        Ok(())
    }

    async fn finish(&mut self, mut report: IndexReport, start: Instant) -> Result<IndexReport> {
        self.storage.persist().await?;
        report.store = self.storage.get_stats().await;
        report.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::info!(
            "Indexing complete: {} ok, {} errors, {} skipped ({} files / {} functions in store)",
            report.success,
            report.errors,
            report.skipped,
            report.store.total_files,
            report.store.total_functions
        );
        Ok(report)
    }

    fn normalize_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
        let mut normalized = relative.to_string_lossy().to_string();
        if normalized.contains('\\') {
            normalized = normalized.replace('\\', "/");
        }
        normalized
    }

    /// Repository-relative form of a user-supplied path; `None` if it leaves
    /// the root.
    fn relative_path(&self, raw: &str) -> Option<String> {
        let raw = raw.replace('\\', "/");
        let path = Path::new(&raw);
        let path = if path.is_absolute() {
            path.strip_prefix(&self.root).ok()?
        } else {
            path
        };

        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => parts.push(name.to_string_lossy().to_string()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}
