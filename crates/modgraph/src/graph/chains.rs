//! Import chain search for ModuleGraph.

use super::ModuleGraph;
use super::queries::selector_matcher;
use crate::filter::{Matcher, Pattern};

impl ModuleGraph {
    /// Every simple import path from an entrypoint to a module matching
    /// `target`.
    ///
    /// Depth-first from each entrypoint in order. A module already on the
    /// current path is never re-entered, so cycles terminate, and a matching
    /// module ends its branch. Each chain runs from the entrypoint to the
    /// match inclusive.
    pub fn find_import_chains(&self, target: impl Into<Pattern>) -> Vec<Vec<String>> {
        let matcher = selector_matcher(&target.into());
        let mut chains = Vec::new();

        for entry in &self.entrypoints {
            let mut prefix = vec![entry.clone()];
            self.collect_chains(&matcher, &mut prefix, &mut chains);
        }

        chains
    }

    fn collect_chains(
        &self,
        target: &Matcher,
        prefix: &mut Vec<String>,
        chains: &mut Vec<Vec<String>>,
    ) {
        let Some(current) = prefix.last() else {
            return;
        };

        if target.is_match(current) {
            chains.push(prefix.clone());
            return;
        }

        let deps: Vec<String> = self.dependencies(current).map(str::to_string).collect();
        for dep in deps {
            if prefix.contains(&dep) {
                continue;
            }
            prefix.push(dep);
            self.collect_chains(target, prefix, chains);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Module, ModuleGraph};

    fn graph_with_edges(entry: &str, edges: &[(&str, &str)]) -> ModuleGraph {
        let mut graph = ModuleGraph::new("/project");
        graph.insert_stub(Module::new(format!("/project/{}", entry), entry));
        graph.push_entrypoint(entry);
        for (from, to) in edges {
            graph.insert_stub(Module::new(format!("/project/{}", from), *from));
            graph.insert_stub(Module::new(format!("/project/{}", to), *to));
            graph.add_edge(from, to);
        }
        graph
    }

    #[test]
    fn test_linear_chain() {
        let graph = graph_with_edges("a.js", &[("a.js", "b.js"), ("b.js", "c.js")]);
        assert_eq!(
            graph.find_import_chains("c.js"),
            vec![vec!["a.js", "b.js", "c.js"]]
        );
    }

    #[test]
    fn test_multiple_simple_paths() {
        let graph = graph_with_edges(
            "a.js",
            &[("a.js", "b.js"), ("a.js", "c.js"), ("b.js", "c.js")],
        );
        let chains = graph.find_import_chains("c.js");
        assert_eq!(chains.len(), 2);
        assert!(chains.contains(&vec!["a.js".into(), "c.js".into()]));
        assert!(chains.contains(&vec!["a.js".into(), "b.js".into(), "c.js".into()]));
    }

    #[test]
    fn test_cycles_terminate() {
        let graph = graph_with_edges(
            "a.js",
            &[("a.js", "b.js"), ("b.js", "a.js"), ("b.js", "c.js")],
        );
        assert_eq!(
            graph.find_import_chains("c.js"),
            vec![vec!["a.js", "b.js", "c.js"]]
        );
    }

    #[test]
    fn test_unreachable_target() {
        let graph = graph_with_edges("a.js", &[("a.js", "b.js")]);
        assert!(graph.find_import_chains("z.js").is_empty());
    }

    #[test]
    fn test_glob_target() {
        let graph = graph_with_edges("a.js", &[("a.js", "lib/x.css")]);
        assert_eq!(
            graph.find_import_chains("**/*.css"),
            vec![vec!["a.js", "lib/x.css"]]
        );
    }
}
