//! In-memory collaborators for tests.
//!
//! [`MemoryRuntime`] serves files from a map and counts reads.
//! [`MapResolver`] resolves against the same map with a small subset of Node
//! rules: relative and absolute paths, `.js` and `/index.js` probing, and
//! bare specifiers looked up under `<root>/node_modules`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::resolver::{ResolveError, Resolver};
use crate::runtime::{Runtime, RuntimeError, RuntimeResult};
use crate::specifier::{NODE_MODULES, is_bare_module_specifier};

/// Runtime serving files from memory.
#[derive(Debug, Clone)]
pub struct MemoryRuntime {
    root: PathBuf,
    files: Arc<FxHashMap<PathBuf, String>>,
    reads: Arc<AtomicUsize>,
}

impl MemoryRuntime {
    /// Build a runtime rooted at `root`; file paths are relative to it.
    pub fn new(root: impl Into<PathBuf>, files: &[(&str, &str)]) -> Self {
        let root = root.into();
        let files = files
            .iter()
            .map(|(path, content)| (root.join(path).clean(), content.to_string()))
            .collect();
        Self {
            root,
            files: Arc::new(files),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of `read_to_string` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// A resolver over the same files.
    pub fn resolver(&self) -> MapResolver {
        MapResolver {
            root: self.root.clone(),
            files: Arc::clone(&self.files),
        }
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.root.clone())
    }
}

/// Resolver over a [`MemoryRuntime`]'s files. Ignores export conditions.
#[derive(Debug, Clone)]
pub struct MapResolver {
    root: PathBuf,
    files: Arc<FxHashMap<PathBuf, String>>,
}

impl MapResolver {
    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        let with_js = PathBuf::from(format!("{}.js", candidate.display()));
        let index = candidate.join("index.js");
        [candidate.to_path_buf(), with_js, index]
            .into_iter()
            .find(|path| self.files.contains_key(path))
    }
}

#[async_trait]
impl Resolver for MapResolver {
    async fn resolve(
        &self,
        specifier: &str,
        from_dir: &Path,
        _conditions: &[String],
    ) -> Result<PathBuf, ResolveError> {
        let candidate = if is_bare_module_specifier(specifier) {
            self.root.join(NODE_MODULES).join(specifier)
        } else {
            from_dir.join(specifier)
        };

        self.probe(&candidate.clean()).ok_or_else(|| {
            ResolveError::new(format!(
                "Cannot find module '{}' from '{}'",
                specifier,
                from_dir.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_runtime_reads_and_counts() {
        let runtime = MemoryRuntime::new("/p", &[("a.js", "export {}")]);
        assert_eq!(runtime.read_to_string(Path::new("/p/a.js")).await.unwrap(), "export {}");
        assert!(runtime.read_to_string(Path::new("/p/b.js")).await.is_err());
        assert_eq!(runtime.reads(), 2);
    }

    #[tokio::test]
    async fn test_map_resolver_probes() {
        let runtime = MemoryRuntime::new(
            "/p",
            &[
                ("src/a.js", ""),
                ("src/lib/index.js", ""),
                ("node_modules/foo/bar.js", ""),
                ("node_modules/foo/index.js", ""),
            ],
        );
        let resolver = runtime.resolver();
        let from = Path::new("/p/src");

        assert_eq!(
            resolver.resolve("./a", from, &[]).await.unwrap(),
            PathBuf::from("/p/src/a.js")
        );
        assert_eq!(
            resolver.resolve("./lib", from, &[]).await.unwrap(),
            PathBuf::from("/p/src/lib/index.js")
        );
        assert_eq!(
            resolver.resolve("../src/a.js", from, &[]).await.unwrap(),
            PathBuf::from("/p/src/a.js")
        );
        assert_eq!(
            resolver.resolve("foo/bar.js", from, &[]).await.unwrap(),
            PathBuf::from("/p/node_modules/foo/bar.js")
        );
        assert_eq!(
            resolver.resolve("foo", from, &[]).await.unwrap(),
            PathBuf::from("/p/node_modules/foo/index.js")
        );
        assert!(resolver.resolve("./missing", from, &[]).await.is_err());
    }
}
