use pretty_assertions::assert_eq;
use rag_graph::{Dependencies, DependencyGraph};
use tempfile::TempDir;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn graph_survives_reload() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("db").join("dependencies.json");

    let mut graph = DependencyGraph::load(&path).await.unwrap();
    assert!(graph.is_empty());
    graph
        .update("lib/date.ts", vec![], strings(&["formatDate"]))
        .await
        .unwrap();
    graph
        .update("lib/app.ts", strings(&["./date"]), vec![])
        .await
        .unwrap();
    assert!(path.exists());

    let reloaded = DependencyGraph::load(&path).await.unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(
        reloaded.get("lib/date.ts"),
        Dependencies {
            imports: vec![],
            imported_by: strings(&["lib/app.ts"]),
        }
    );
    assert_eq!(
        reloaded.node("lib/date.ts").unwrap().exports,
        strings(&["formatDate"])
    );
}

#[tokio::test]
async fn file_is_a_path_keyed_json_object() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dependencies.json");

    let mut graph = DependencyGraph::load(&path).await.unwrap();
    graph.update("a.py", strings(&["os"]), vec![]).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "a.py": { "imports": ["os"], "exports": [], "imported_by": [] }
        })
    );
}

#[tokio::test]
async fn corrupt_file_loads_as_empty_graph() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dependencies.json");
    std::fs::write(&path, "{ not json").unwrap();

    let graph = DependencyGraph::load(&path).await.unwrap();
    assert!(graph.is_empty());
}

#[tokio::test]
async fn clear_removes_backing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dependencies.json");

    let mut graph = DependencyGraph::load(&path).await.unwrap();
    graph.update("a.py", vec![], vec![]).await.unwrap();
    graph.clear().await.unwrap();

    assert!(graph.is_empty());
    assert!(!path.exists());
    assert!(DependencyGraph::load(&path).await.unwrap().is_empty());
}

#[tokio::test]
async fn removal_is_persisted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dependencies.json");

    let mut graph = DependencyGraph::load(&path).await.unwrap();
    graph.update("a.py", vec![], vec![]).await.unwrap();
    graph.update("b.py", vec![], vec![]).await.unwrap();
    graph.remove("a.py").await.unwrap();

    let reloaded = DependencyGraph::load(&path).await.unwrap();
    assert_eq!(reloaded.paths().collect::<Vec<_>>(), vec!["b.py"]);
}
