//! Read queries for ModuleGraph.

use std::path::Path;

use serde_json::{Map, Value};

use super::{Diagnostic, ExternalModule, Module, ModuleGraph};
use crate::filter::{Matcher, Pattern};

impl ModuleGraph {
    /// First module whose path matches `selector`.
    ///
    /// The selector is an exact path, a glob, or a predicate. Modules are
    /// tried in discovery order. A string that fails to compile as a glob is
    /// treated as an exact path.
    pub fn get(&self, selector: impl Into<Pattern>) -> Option<&Module> {
        let selector = selector.into();
        if let Pattern::Text(text) = &selector {
            if let Some(module) = self.modules.get(text.as_str()) {
                return Some(module);
            }
        }

        let matcher = selector_matcher(&selector);
        self.modules
            .iter()
            .find(|(path, _)| matcher.is_match(path))
            .map(|(_, module)| module)
    }

    /// Module by exact path.
    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.get(path)
    }

    /// Every path appearing as an edge source or target, sorted.
    ///
    /// Scanned modules count as edge sources even without dependencies.
    pub fn unique_modules(&self) -> Vec<String> {
        let mut unique: Vec<String> = self
            .graph
            .iter()
            .flat_map(|(from, deps)| std::iter::once(from).chain(deps.iter()))
            .cloned()
            .collect();
        unique.sort();
        unique.dedup();
        unique
    }

    /// Direct dependencies of `path`.
    pub fn dependencies<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.graph
            .get(path)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Direct importers of `path`.
    pub fn dependents<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.modules
            .get(path)
            .into_iter()
            .flat_map(|module| module.imported_by.iter().map(String::as_str))
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.graph.get(from).is_some_and(|deps| deps.contains(to))
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn external_modules(&self) -> impl Iterator<Item = &ExternalModule> {
        self.external_modules.values()
    }

    /// External record by absolute location (`href`).
    pub fn external_module(&self, href: &str) -> Option<&ExternalModule> {
        self.external_modules.get(href)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn entrypoints(&self) -> &[String] {
        &self.entrypoints
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Non-fatal failures, in the order they were encountered.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

pub(super) fn selector_matcher(selector: &Pattern) -> Matcher {
    match selector.compile() {
        Ok(matcher) => matcher,
        Err(_) => match selector {
            Pattern::Text(text) => Matcher::Exact(text.clone()),
            Pattern::Predicate(predicate) => Matcher::Predicate(predicate.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModuleGraph {
        let mut graph = ModuleGraph::new("/project");
        for path in ["a.js", "src/b.js", "src/c.css"] {
            graph.insert_stub(Module::new(format!("/project/{}", path), path));
        }
        graph.push_entrypoint("a.js");
        graph.add_edge("a.js", "src/b.js");
        graph.add_edge("src/b.js", "src/c.css");
        graph
    }

    #[test]
    fn test_get_exact_glob_and_predicate() {
        let graph = sample();
        assert_eq!(graph.get("src/b.js").unwrap().relative_path, "src/b.js");
        assert_eq!(graph.get("**/*.css").unwrap().relative_path, "src/c.css");
        assert_eq!(
            graph
                .get(Pattern::predicate(|p| p.starts_with("src/")))
                .unwrap()
                .relative_path,
            "src/b.js"
        );
        assert!(graph.get("missing.js").is_none());
    }

    #[test]
    fn test_get_invalid_glob_falls_back_to_exact() {
        let mut graph = sample();
        graph.insert_stub(Module::new("/project/[x.js", "[x.js"));
        assert_eq!(graph.get("[x.js").unwrap().relative_path, "[x.js");
    }

    #[test]
    fn test_unique_modules_includes_sources_and_targets() {
        let graph = sample();
        assert_eq!(graph.unique_modules(), vec!["a.js", "src/b.js", "src/c.css"]);
    }

    #[test]
    fn test_dependencies_and_dependents() {
        let graph = sample();
        assert_eq!(graph.dependencies("a.js").collect::<Vec<_>>(), vec!["src/b.js"]);
        assert_eq!(graph.dependents("src/b.js").collect::<Vec<_>>(), vec!["a.js"]);
        assert!(graph.has_edge("src/b.js", "src/c.css"));
        assert!(!graph.has_edge("a.js", "src/c.css"));
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.entrypoints(), ["a.js".to_string()]);
    }
}
