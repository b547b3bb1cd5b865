use rag_vector_store::StoreStats;
use serde::Serialize;

/// Outcome of one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Files considered for indexing
    pub total: usize,

    /// Files whose file-level chunk was stored
    pub success: usize,

    /// Files that could not be read or stored
    pub errors: usize,

    /// Paths skipped as missing, ignored or unsupported
    pub skipped: usize,

    /// Chunks stored (file and symbol level)
    pub chunks: usize,

    /// Symbol chunks that failed to build or store
    pub chunk_errors: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Store totals after the run
    pub store: StoreStats,
}

impl IndexReport {
    pub(crate) fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Indexed {
                chunks,
                chunk_errors,
            } => {
                self.success += 1;
                self.chunks += chunks;
                self.chunk_errors += chunk_errors;
            }
            FileOutcome::Failed => self.errors += 1,
            FileOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileOutcome {
    Indexed { chunks: usize, chunk_errors: usize },
    Failed,
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_accumulate() {
        let mut report = IndexReport::default();
        report.record(FileOutcome::Indexed {
            chunks: 3,
            chunk_errors: 1,
        });
        report.record(FileOutcome::Failed);
        report.record(FileOutcome::Skipped);

        assert_eq!(
            (report.success, report.errors, report.skipped),
            (1, 1, 1)
        );
        assert_eq!((report.chunks, report.chunk_errors), (3, 1));
    }
}
