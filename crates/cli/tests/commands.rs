use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn review_rag(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("review-rag").expect("binary");
    cmd.env("RAG_EMBEDDING_MODE", "hashed")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

fn run_json(root: &Path, args: &[&str]) -> Value {
    let output = review_rag(root).args(args).output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_repo() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("app")).unwrap();
    fs::write(
        root.join("app/config.py"),
        "import json\n\ndef load_config(path):\n    with open(path) as fp:\n        return json.load(fp)\n",
    )
    .unwrap();
    fs::write(
        root.join("app/main.py"),
        "from app.config import load_config\n\ndef main():\n    return load_config('settings.json')\n",
    )
    .unwrap();
    fs::write(
        root.join("app/render.ts"),
        "export function renderPage(title: string) {\n  return `<h1>${title}</h1>`;\n}\n",
    )
    .unwrap();
    temp
}

#[test]
fn index_reports_json() {
    let temp = setup_repo();

    let report = run_json(temp.path(), &["index", "--json"]);

    assert_eq!(report["total"], 3);
    assert_eq!(report["success"], 3);
    assert_eq!(report["errors"], 0);
    assert_eq!(report["store"]["total_files"], 3);
    assert!(temp.path().join(".review-rag/collection.json").is_file());
    assert!(temp.path().join(".review-rag/dependencies.json").is_file());
}

#[test]
fn index_prints_summary_without_json() {
    let temp = setup_repo();

    review_rag(temp.path())
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 3/3 files"));
}

#[test]
fn context_excludes_the_queried_file() {
    let temp = setup_repo();
    run_json(temp.path(), &["index", "--json"]);
    fs::write(
        temp.path().join("change.diff"),
        "--- a/app/main.py\n+++ b/app/main.py\n@@ -1,3 +1,3 @@\n-    return load_config('settings.json')\n+    return load_config('prod.json')\n",
    )
    .unwrap();

    let context = run_json(
        temp.path(),
        &["context", "app/main.py", "--diff", "change.diff", "--top-k", "2"],
    );

    let files = context["similar_files"].as_array().unwrap();
    let functions = context["related_functions"].as_array().unwrap();
    assert!(files.len() <= 2);
    assert!(functions.len() <= 2);
    assert!(files.iter().all(|f| f["path"] != "app/main.py"));
    assert!(functions.iter().all(|f| f["path"] != "app/main.py"));
    assert_eq!(context["dependencies"]["imports"][0], "app.config");
}

#[test]
fn importer_shows_up_in_dependencies() {
    let temp = setup_repo();
    run_json(temp.path(), &["index", "--json"]);

    let context = run_json(temp.path(), &["context", "app/config.py"]);

    assert_eq!(context["dependencies"]["imported_by"][0], "app/main.py");
}

#[test]
fn context_on_empty_store_is_empty() {
    let temp = setup_repo();

    let context = run_json(temp.path(), &["context", "app/main.py"]);

    assert_eq!(context["similar_files"], serde_json::json!([]));
    assert_eq!(context["related_functions"], serde_json::json!([]));
}

#[test]
fn search_returns_flat_hits() {
    let temp = setup_repo();
    run_json(temp.path(), &["index", "--json"]);

    let hits = run_json(
        temp.path(),
        &["search", "def load_config(path): return json.load(fp)", "--top-k", "3"],
    );

    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.get("similarity").is_some()));
    assert!(hits.iter().all(|h| h.get("type").is_some()));
}

#[test]
fn update_reindexes_named_paths() {
    let temp = setup_repo();
    run_json(temp.path(), &["index", "--json"]);
    fs::write(
        temp.path().join("app/config.py"),
        "def load_config(path):\n    return {}\n\ndef save_config(path, data):\n    pass\n",
    )
    .unwrap();

    let report = run_json(
        temp.path(),
        &["update", "app/config.py", "missing.py", "--json"],
    );

    assert_eq!(report["total"], 2);
    assert_eq!(report["success"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["store"]["total_functions"], 4);
}

#[test]
fn update_without_git_changes_is_a_no_op() {
    let temp = setup_repo();

    let report = run_json(temp.path(), &["update", "--json"]);

    assert_eq!(report["total"], 0);
}

#[test]
fn stats_and_reset() {
    let temp = setup_repo();
    run_json(temp.path(), &["index", "--json"]);

    let stats = run_json(temp.path(), &["stats"]);
    assert_eq!(stats["total_files"], 3);
    assert_eq!(stats["graph_nodes"], 3);

    review_rag(temp.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset store"));
    assert!(!temp.path().join(".review-rag/dependencies.json").exists());

    let stats = run_json(temp.path(), &["stats"]);
    assert_eq!(stats["total_items"], 0);
    assert_eq!(stats["graph_nodes"], 0);
}

#[test]
fn db_flag_moves_the_store() {
    let temp = setup_repo();
    let db = tempdir().unwrap();

    review_rag(temp.path())
        .arg("--db")
        .arg(db.path())
        .args(["index", "--json"])
        .assert()
        .success();

    assert!(db.path().join("collection.json").is_file());
    assert!(!temp.path().join(".review-rag").exists());
}

#[test]
fn config_file_sets_defaults() {
    let temp = setup_repo();
    fs::write(
        temp.path().join("review-rag.toml"),
        "[store]\npersist_dir = \"rag-data\"\n\n[retriever]\ntop_k = 1\n",
    )
    .unwrap();
    run_json(temp.path(), &["index", "--json"]);

    let context = run_json(temp.path(), &["context", "app/main.py"]);

    assert!(temp.path().join("rag-data/collection.json").is_file());
    assert!(context["similar_files"].as_array().unwrap().len() <= 1);
    assert!(context["related_functions"].as_array().unwrap().len() <= 1);
}

#[test]
fn missing_explicit_config_fails() {
    let temp = setup_repo();

    review_rag(temp.path())
        .args(["--config", "does-not-exist.toml", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}
