use crate::error::{IndexerError, Result};
use rag_code_chunker::Language;
use std::collections::HashSet;
use std::path::Path;
use tokio::time::{timeout, Duration};

const GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Files changed relative to `HEAD` plus untracked files, restricted to
/// supported languages. Paths are relative to `root`, which may be a
/// subdirectory of the work tree.
///
/// A failing git command is logged and contributes nothing; the other
/// command's output is still used.
pub async fn changed_files(root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for args in [
        &["diff", "--relative", "--name-only", "HEAD"][..],
        &["ls-files", "--others", "--exclude-standard"][..],
    ] {
        match git_lines(root, args).await {
            Ok(out) => lines.extend(out),
            Err(e) => log::warn!("Could not list changed files: {e}"),
        }
    }

    let files = select_supported(lines);
    log::info!("Detected {} changed files", files.len());
    files
}

async fn git_lines(root: &Path, args: &[&str]) -> Result<Vec<String>> {
    let output = timeout(
        GIT_TIMEOUT,
        tokio::process::Command::new("git")
            .arg("-C")
            .arg(root)
            .args(args)
            .output(),
    )
    .await
    .map_err(|_| IndexerError::GitError(format!("git {} timed out", args.join(" "))))??;

    if !output.status.success() {
        return Err(IndexerError::GitError(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// Deduplicate (first occurrence wins) and keep supported extensions.
fn select_supported(lines: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|path| Language::from_path(path).is_supported())
        .filter(|path| seen.insert(path.clone()))
        .collect()
}
