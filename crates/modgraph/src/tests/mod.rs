//! Build scenarios and shared test helpers.

mod native_tests;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::GraphBuilder;
use crate::graph::ModuleGraph;
use crate::test_utils::MemoryRuntime;

pub(crate) const ROOT: &str = "/project";

/// Builder wired to an in-memory project rooted at [`ROOT`].
pub(crate) fn memory_builder(files: &[(&str, &str)]) -> (GraphBuilder, MemoryRuntime) {
    let runtime = MemoryRuntime::new(ROOT, files);
    let builder = GraphBuilder::new()
        .base_path(ROOT)
        .runtime(Arc::new(runtime.clone()))
        .resolver(Arc::new(runtime.resolver()));
    (builder, runtime)
}

/// Create a test project with the given files and return its canonical root.
pub(crate) fn create_test_project(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp
        .path()
        .canonicalize()
        .expect("Failed to canonicalize temp dir");

    for (path, content) in files {
        let file_path = root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|_| panic!("Failed to create parent directory for {}", path));
        }
        fs::write(&file_path, content).unwrap_or_else(|_| panic!("Failed to write file {}", path));
    }

    root
}

/// Every adjacency member must be a known module.
pub(crate) fn assert_closed(graph: &ModuleGraph) {
    for path in graph.unique_modules() {
        assert!(graph.contains(&path), "edge endpoint {} has no module", path);
    }
}

/// Sorted `(from, to)` pairs.
pub(crate) fn edges(graph: &ModuleGraph) -> Vec<(String, String)> {
    let mut edges: Vec<(String, String)> = graph
        .unique_modules()
        .into_iter()
        .flat_map(|from| {
            graph
                .dependencies(&from)
                .map(|to| (from.clone(), to.to_string()))
                .collect::<Vec<_>>()
        })
        .collect();
    edges.sort();
    edges
}
