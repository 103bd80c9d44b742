//! Worklist traversal that populates the module graph.
//!
//! Modules are scanned in discovery order. A path is enqueued the first time
//! a non-foreign import reaches it, so the queue never holds a path twice and
//! every module is scanned at most once. Hooks, reads, lexing and resolution are
//! awaited one at a time.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use super::{BuildConfig, ScanErrorPolicy};
use crate::error::{Error, Result};
use crate::filter::Filters;
use crate::graph::{Diagnostic, DiagnosticKind, Module, ModuleGraph};
use crate::lexer::{ImportRecord, Lexer};
use crate::plugin::{AnalyzeContext, ResolveContext, StartContext};
use crate::resolver::Resolver;
use crate::runtime::Runtime;
use crate::specifier::{
    is_bare_module_specifier, is_builtin_module, is_relative_specifier, package_root,
    relative_path, root_package_name,
};

/// Where an import resolved to.
enum Target {
    Virtual(String),
    File(PathBuf),
}

/// Traversal state for a single build.
pub(super) struct Traversal<'a> {
    pub(super) config: &'a BuildConfig,
    pub(super) filters: Filters,
    pub(super) runtime: &'a dyn Runtime,
    pub(super) lexer: &'a dyn Lexer,
    pub(super) resolver: &'a dyn Resolver,
    pub(super) base_path: PathBuf,
    pub(super) graph: ModuleGraph,
    pub(super) pending: VecDeque<String>,
    /// Paths ever pushed onto `pending`. Separate from module existence:
    /// a foreign import can create a stub that a later import still queues.
    pub(super) queued: FxHashSet<String>,
}

impl Traversal<'_> {
    pub(super) async fn run(mut self, entrypoints: &[String]) -> Result<ModuleGraph> {
        info!(
            entrypoints = entrypoints.len(),
            base_path = %self.base_path.display(),
            "Building module graph"
        );

        for entrypoint in entrypoints {
            self.seed(entrypoint).await?;
        }

        let start = StartContext {
            entrypoints: self.graph.entrypoints(),
            base_path: &self.base_path,
            conditions: &self.config.conditions,
        };
        self.config.plugins.run_start(&start).await?;

        while let Some(path) = self.pending.pop_front() {
            self.scan(&path).await?;
        }

        self.graph.sync_external_modules();
        self.config.plugins.run_end(&mut self.graph).await?;
        self.graph.sync_external_modules();

        info!(
            modules = self.graph.len(),
            external = self.graph.external_modules().count(),
            diagnostics = self.graph.diagnostics().len(),
            "Module graph complete"
        );
        Ok(self.graph)
    }

    async fn seed(&mut self, entrypoint: &str) -> Result<()> {
        let specifier = if is_relative_specifier(entrypoint) || Path::new(entrypoint).is_absolute()
        {
            entrypoint.to_string()
        } else {
            format!("./{}", entrypoint)
        };

        let resolved = self
            .resolver
            .resolve(&specifier, &self.base_path, &self.config.conditions)
            .await
            .map_err(|e| Error::EntrypointResolution {
                specifier: entrypoint.to_string(),
                reason: e.message,
            })?;

        let relative = relative_path(&self.base_path, &resolved);
        self.graph.push_entrypoint(&relative);
        self.graph.insert_stub(file_stub(resolved, &relative));
        self.enqueue(&relative);
        Ok(())
    }

    async fn scan(&mut self, path: &str) -> Result<()> {
        let Some(module_path) = self.graph.module(path).map(|m| m.path.clone()) else {
            return Ok(());
        };
        debug!(path, "Scanning module");
        self.graph.touch(path);

        let source = match self.runtime.read_to_string(&module_path).await {
            Ok(source) => source,
            Err(source) => {
                let err = Error::Read {
                    path: module_path,
                    source,
                };
                return self.scan_failed(path, err);
            }
        };

        let lexed = match self.lexer.lex(&module_path, &source) {
            Ok(lexed) => lexed,
            Err(e) => {
                let err = Error::Lex {
                    path: module_path,
                    message: e.message,
                };
                return self.scan_failed(path, err);
            }
        };

        for record in &lexed.imports {
            self.process_import(path, &module_path, &source, record)
                .await?;
        }

        self.graph
            .populate(path, source.clone(), lexed.facade, lexed.has_module_syntax);

        let mut ctx = AnalyzeContext {
            graph: &mut self.graph,
            path,
            source: &source,
            imports: &lexed.imports,
        };
        self.config.plugins.run_analyze(&mut ctx).await
    }

    fn scan_failed(&mut self, path: &str, err: Error) -> Result<()> {
        match self.config.scan_error_policy {
            ScanErrorPolicy::Abort => Err(err),
            ScanErrorPolicy::Skip => {
                warn!(path, error = %err, "Skipping unreadable module");
                self.graph.push_diagnostic(Diagnostic {
                    kind: DiagnosticKind::Unreadable,
                    specifier: None,
                    importer: path.to_string(),
                    message: err.to_string(),
                });
                Ok(())
            }
        }
    }

    async fn process_import(
        &mut self,
        importer: &str,
        importer_path: &Path,
        source: &str,
        record: &ImportRecord,
    ) -> Result<()> {
        let Some(specifier) = record.specifier.as_deref().filter(|s| !s.is_empty()) else {
            debug!(importer, start = record.start, "Skipping non-static import");
            return Ok(());
        };

        if record.is_dynamic() && self.config.ignore_dynamic_imports {
            debug!(importer, specifier, "Skipping dynamic import");
            return Ok(());
        }

        if let Some(reason) = self.filters.check_external(specifier) {
            debug!(importer, specifier, %reason, "Dropping external import");
            return Ok(());
        }

        let Some(importee) = self
            .config
            .plugins
            .run_handle_import(source, importer, specifier)
            .await?
        else {
            debug!(importer, specifier, "Import skipped by plugin");
            return Ok(());
        };

        if is_builtin_module(&importee) {
            debug!(importer, specifier = %importee, "Skipping built-in module");
            return Ok(());
        }

        let Some(target) = self.resolve(importer, importer_path, &importee).await? else {
            return Ok(());
        };

        let is_virtual = matches!(target, Target::Virtual(_));
        let (dependency, stub) = match target {
            Target::Virtual(specifier) => {
                let stub = Module::virtual_module(&specifier);
                (specifier, stub)
            }
            Target::File(resolved) => {
                let relative = relative_path(&self.base_path, &resolved);
                let stub = file_stub(resolved, &relative);
                (relative, stub)
            }
        };

        if self.filters.is_excluded(&dependency) {
            debug!(importer, dependency = %dependency, "Dropping excluded module");
            return Ok(());
        }

        self.graph.insert_stub(stub);
        if !is_virtual && is_bare_module_specifier(specifier) {
            self.graph
                .record_external(&dependency, root_package_name(specifier), specifier);
        }

        let is_foreign =
            self.filters.is_foreign(&importee) || self.filters.is_foreign(&dependency);
        if !is_virtual && !is_foreign {
            self.enqueue(&dependency);
        }

        self.graph.add_edge(importer, &dependency);
        Ok(())
    }

    fn enqueue(&mut self, path: &str) {
        if self.queued.insert(path.to_string()) {
            self.pending.push_back(path.to_string());
        }
    }

    /// Resolve an importee. Failures are recorded and yield `None`.
    async fn resolve(
        &mut self,
        importer: &str,
        importer_path: &Path,
        importee: &str,
    ) -> Result<Option<Target>> {
        if self.filters.is_virtual(importee) {
            return Ok(Some(Target::Virtual(importee.to_string())));
        }

        let importer_dir = importer_path.parent().unwrap_or(&self.base_path);

        let ctx = ResolveContext {
            importee,
            importer,
            importer_path,
            conditions: &self.config.conditions,
            resolver_options: &self.config.resolver_options,
        };
        if let Some(resolved) = self.config.plugins.run_resolve(&ctx).await? {
            let resolved = if resolved.is_relative() {
                importer_dir.join(resolved).clean()
            } else {
                resolved
            };
            return Ok(Some(Target::File(resolved)));
        }

        match self
            .resolver
            .resolve(importee, importer_dir, &self.config.conditions)
            .await
        {
            Ok(resolved) => Ok(Some(Target::File(resolved))),
            Err(e) => {
                let err = Error::Resolution {
                    specifier: importee.to_string(),
                    importer: importer.to_string(),
                    reason: e.message,
                };
                warn!("{}", err);
                self.graph.push_diagnostic(Diagnostic {
                    kind: DiagnosticKind::Unresolved,
                    specifier: Some(importee.to_string()),
                    importer: importer.to_string(),
                    message: err.to_string(),
                });
                Ok(None)
            }
        }
    }
}

fn file_stub(path: PathBuf, relative: &str) -> Module {
    let mut module = Module::new(path, relative);
    module.package_root = package_root(&module.path);
    module
}
