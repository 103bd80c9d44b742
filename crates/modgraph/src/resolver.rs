//! Specifier resolution.
//!
//! [`NodeResolver`] implements Node's ESM resolution (package `exports`,
//! export conditions, extensions, symlinks) on top of `oxc_resolver`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Options passed through to the default resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Export conditions appended to the build's condition list.
    pub conditions: Vec<String>,
    /// Keep symlinked paths instead of resolving them to their targets.
    pub preserve_symlinks: bool,
    /// Extensions tried for extensionless specifiers, in order.
    pub extensions: Vec<String>,
    /// `package.json` fields consulted when a package has no `exports`.
    pub main_fields: Vec<String>,
    /// Specifier prefix → replacement targets, tried in order.
    pub alias: BTreeMap<String, Vec<String>>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            preserve_symlinks: false,
            extensions: [".js", ".mjs", ".cjs", ".ts", ".mts", ".cts", ".jsx", ".tsx", ".json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            main_fields: vec!["module".to_string(), "main".to_string()],
            alias: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Maps a specifier to an absolute module location.
#[async_trait]
pub trait Resolver: Send + Sync + std::fmt::Debug {
    /// Resolve `specifier` as imported from a module in `from_dir`.
    async fn resolve(
        &self,
        specifier: &str,
        from_dir: &Path,
        conditions: &[String],
    ) -> Result<PathBuf, ResolveError>;
}

/// Node-style resolver backed by `oxc_resolver`.
///
/// One underlying resolver is kept per distinct condition set; they share
/// the filesystem cache of the first.
#[derive(Debug)]
pub struct NodeResolver {
    options: ResolverOptions,
    base: oxc_resolver::Resolver,
    by_conditions: Mutex<FxHashMap<Vec<String>, Arc<oxc_resolver::Resolver>>>,
}

impl NodeResolver {
    pub fn new(options: ResolverOptions) -> Self {
        let base = oxc_resolver::Resolver::new(oxc_options(&options, &[]));
        Self {
            options,
            base,
            by_conditions: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    fn for_conditions(&self, conditions: &[String]) -> Arc<oxc_resolver::Resolver> {
        let mut cache = self.by_conditions.lock();
        if let Some(resolver) = cache.get(conditions) {
            return Arc::clone(resolver);
        }

        let resolver = Arc::new(
            self.base
                .clone_with_options(oxc_options(&self.options, conditions)),
        );
        cache.insert(conditions.to_vec(), Arc::clone(&resolver));
        resolver
    }
}

impl Default for NodeResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

#[async_trait]
impl Resolver for NodeResolver {
    async fn resolve(
        &self,
        specifier: &str,
        from_dir: &Path,
        conditions: &[String],
    ) -> Result<PathBuf, ResolveError> {
        self.for_conditions(conditions)
            .resolve(from_dir, specifier)
            .map(|resolution| resolution.path().to_path_buf())
            .map_err(|e| ResolveError::new(e.to_string()))
    }
}

fn oxc_options(options: &ResolverOptions, conditions: &[String]) -> oxc_resolver::ResolveOptions {
    let mut condition_names: Vec<String> = conditions.to_vec();
    for extra in &options.conditions {
        if !condition_names.contains(extra) {
            condition_names.push(extra.clone());
        }
    }

    let alias = options
        .alias
        .iter()
        .map(|(prefix, targets)| {
            let values = targets
                .iter()
                .map(|target| oxc_resolver::AliasValue::Path(target.clone()))
                .collect();
            (prefix.clone(), values)
        })
        .collect();

    oxc_resolver::ResolveOptions {
        condition_names,
        extensions: options.extensions.clone(),
        main_fields: options.main_fields.clone(),
        alias,
        symlinks: !options.preserve_symlinks,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    fn conditions(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_relative_with_extension_probe() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root, "src/a.js", "");

        let resolver = NodeResolver::default();
        let resolved = resolver
            .resolve("./src/a", &root, &conditions(&["node", "import"]))
            .await
            .unwrap();
        assert_eq!(resolved, root.join("src/a.js"));
    }

    #[tokio::test]
    async fn test_package_exports_follow_conditions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(
            &root,
            "node_modules/pkg/package.json",
            r#"{
                "name": "pkg",
                "exports": {
                    ".": { "browser": "./browser.js", "import": "./esm.js", "default": "./cjs.js" }
                }
            }"#,
        );
        write(&root, "node_modules/pkg/browser.js", "");
        write(&root, "node_modules/pkg/esm.js", "");
        write(&root, "node_modules/pkg/cjs.js", "");

        let resolver = NodeResolver::default();
        let node = resolver
            .resolve("pkg", &root, &conditions(&["node", "import"]))
            .await
            .unwrap();
        assert_eq!(node, root.join("node_modules/pkg/esm.js"));

        let browser = resolver
            .resolve("pkg", &root, &conditions(&["browser", "import"]))
            .await
            .unwrap();
        assert_eq!(browser, root.join("node_modules/pkg/browser.js"));
    }

    #[tokio::test]
    async fn test_missing_module_is_an_error() {
        let temp = TempDir::new().unwrap();
        let resolver = NodeResolver::default();
        let err = resolver
            .resolve("./nope.js", temp.path(), &conditions(&["import"]))
            .await
            .unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ResolverOptions =
            serde_json::from_str(r#"{ "preserveSymlinks": true, "alias": { "@app": ["./src"] } }"#)
                .unwrap();
        assert!(options.preserve_symlinks);
        assert_eq!(options.alias["@app"], vec!["./src".to_string()]);
        assert_eq!(options.main_fields, vec!["module", "main"]);
    }
}
