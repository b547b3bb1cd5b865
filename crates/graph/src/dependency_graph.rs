use crate::error::Result;
use crate::module_path::import_matches;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Import/export record of one indexed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    /// Paths seen importing this file
    #[serde(default)]
    pub imported_by: Vec<String>,
}

/// Dependency view of one path handed to retrieval callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    pub imports: Vec<String>,
    pub imported_by: Vec<String>,
}

impl Dependencies {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.imported_by.is_empty()
    }
}

/// Path-keyed dependency graph persisted as a single JSON document.
///
/// Every mutation rewrites the whole file. `imported_by` is filled only when
/// the imported file is already present at the time its importer is indexed.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, DependencyNode>,
    path: Option<PathBuf>,
}

impl DependencyGraph {
    /// Graph that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the graph stored at `path`.
    ///
    /// A missing file yields an empty graph; so does an unparsable one, after
    /// a warning. It is rewritten on the next mutation.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let nodes = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(nodes) => nodes,
                Err(e) => {
                    log::warn!(
                        "Ignoring unreadable dependency graph {}: {e}",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!(
            "Dependency graph {} has {} nodes",
            path.display(),
            nodes.len()
        );
        Ok(Self {
            nodes,
            path: Some(path),
        })
    }

    /// Record `path` with fresh imports/exports and link it into the
    /// `imported_by` lists of the files it imports.
    pub async fn update(
        &mut self,
        path: &str,
        imports: Vec<String>,
        exports: Vec<String>,
    ) -> Result<()> {
        for import in &imports {
            for (key, node) in &mut self.nodes {
                if key != path
                    && import_matches(key, import, path)
                    && !node.imported_by.iter().any(|p| p == path)
                {
                    node.imported_by.push(path.to_string());
                }
            }
        }

        self.nodes.insert(
            path.to_string(),
            DependencyNode {
                imports,
                exports,
                imported_by: Vec::new(),
            },
        );
        self.save().await
    }

    /// Imports and importers of `path`; empty when unknown
    #[must_use]
    pub fn get(&self, path: &str) -> Dependencies {
        self.nodes
            .get(path)
            .map(|node| Dependencies {
                imports: node.imports.clone(),
                imported_by: node.imported_by.clone(),
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn node(&self, path: &str) -> Option<&DependencyNode> {
        self.nodes.get(path)
    }

    /// Drop the node for `path`. References to it in other nodes stay.
    pub async fn remove(&mut self, path: &str) -> Result<bool> {
        if self.nodes.remove(path).is_none() {
            return Ok(false);
        }
        self.save().await?;
        Ok(true)
    }

    /// Remove every node and the backing file.
    pub async fn clear(&mut self) -> Result<()> {
        self.nodes.clear();
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&self.nodes)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
