//! Mutation methods for ModuleGraph.
//!
//! Structural mutations are crate-private: only the builder adds nodes and
//! edges. Plugins get mutable access to module metadata and graph-level data.

use serde_json::{Map, Value};

use super::{Diagnostic, ExternalModule, Module, ModuleGraph};

impl ModuleGraph {
    /// Mutable access to a module, for plugins attaching derived data.
    pub fn module_mut(&mut self, path: &str) -> Option<&mut Module> {
        self.modules.get_mut(path)
    }

    /// Graph-level data attached by plugins.
    pub fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }

    pub(crate) fn push_entrypoint(&mut self, path: &str) {
        if !self.entrypoints.iter().any(|p| p == path) {
            self.entrypoints.push(path.to_string());
        }
    }

    /// Insert a stub unless a module with the same path exists.
    ///
    /// Returns `true` when the module was newly discovered.
    pub(crate) fn insert_stub(&mut self, module: Module) -> bool {
        if self.modules.contains_key(&module.relative_path) {
            return false;
        }
        self.modules.insert(module.relative_path.clone(), module);
        true
    }

    /// Make sure `path` has an adjacency entry, even without dependencies.
    pub(crate) fn touch(&mut self, path: &str) {
        if !self.graph.contains_key(path) {
            self.graph.insert(path.to_string(), Default::default());
        }
    }

    pub(crate) fn add_edge(&mut self, from: &str, to: &str) {
        self.touch(from);
        if let Some(deps) = self.graph.get_mut(from) {
            deps.insert(to.to_string());
        }
        if let Some(module) = self.modules.get_mut(to) {
            module.add_importer(from);
        }
    }

    /// Create or update the external record for a module reached through a
    /// bare specifier.
    ///
    /// An existing record keeps its data and only takes the newest specifier.
    pub(crate) fn record_external(&mut self, path: &str, package_name: &str, specifier: &str) {
        let Some(module) = self.modules.get(path) else {
            return;
        };

        if let Some(existing) = self.external_modules.get_mut(&module.href) {
            existing.specifier = specifier.to_string();
            return;
        }

        self.external_modules.insert(
            module.href.clone(),
            ExternalModule {
                module: module.clone(),
                package_name: package_name.to_string(),
                specifier: specifier.to_string(),
            },
        );
    }

    /// Write the scan results of a module and mirror them onto its external
    /// record.
    pub(crate) fn populate(
        &mut self,
        path: &str,
        source: String,
        facade: bool,
        has_module_syntax: bool,
    ) {
        let Some(module) = self.modules.get_mut(path) else {
            return;
        };
        module.source = source;
        module.facade = facade;
        module.has_module_syntax = has_module_syntax;

        if let Some(external) = self.external_modules.get_mut(&module.href) {
            external.module = module.clone();
        }
    }

    /// Refresh every external record from its module entry.
    pub(crate) fn sync_external_modules(&mut self) {
        for external in self.external_modules.values_mut() {
            if let Some(module) = self.modules.get(&external.module.relative_path) {
                external.module = module.clone();
            }
        }
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
