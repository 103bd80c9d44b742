//! Plugin hooks for intercepting and augmenting a build.
//!
//! A plugin implements any subset of five hooks. Every hook has a no-op
//! default, so a plugin only overrides what it needs:
//!
//! | hook            | fires                                   | can               |
//! |-----------------|-----------------------------------------|-------------------|
//! | `start`         | once, after entrypoints are seeded      | observe           |
//! | `handle_import` | per import occurrence, before resolving | skip or rewrite   |
//! | `resolve`       | per import, before the default resolver | claim resolution  |
//! | `analyze`       | per scanned module                      | attach metadata   |
//! | `end`           | once, after the worklist drains         | mutate the graph  |
//!
//! Hooks of one kind run strictly one after another in registration order.
//! Rewrites made by one `handle_import` hook are visible to the next, and the
//! first `resolve` hook that answers wins.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashSet;

use crate::error::{Error, HookKind, Result};
use crate::graph::{Module, ModuleGraph};
use crate::lexer::ImportRecord;
use crate::resolver::ResolverOptions;

/// What to do with an import occurrence after a `handle_import` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportAction {
    /// Leave the importee as it is and ask the next hook.
    Continue,
    /// Abandon this occurrence: no resolution, no edge, no module entry.
    Skip,
    /// Replace the importee; later hooks and steps see the replacement.
    Rewrite(String),
}

/// Answer of a `resolve` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Let the next hook, or the default resolver, handle it.
    Unresolved,
    /// Absolute location of the importee. Stops the hook chain.
    Resolved(PathBuf),
}

/// Input of the `start` hook.
#[derive(Debug)]
pub struct StartContext<'a> {
    /// Canonical relative entrypoint paths.
    pub entrypoints: &'a [String],
    pub base_path: &'a Path,
    pub conditions: &'a [String],
}

/// Input of the `handle_import` hook.
#[derive(Debug)]
pub struct HandleImportContext<'a> {
    /// Unmodified source of the importing module.
    pub source: &'a str,
    /// Relative path of the importing module.
    pub importer: &'a str,
    /// Current importee, including rewrites by earlier hooks.
    pub importee: &'a str,
}

/// Input of the `resolve` hook.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    pub importee: &'a str,
    /// Relative path of the importing module.
    pub importer: &'a str,
    /// Absolute path of the importing module.
    pub importer_path: &'a Path,
    pub conditions: &'a [String],
    pub resolver_options: &'a ResolverOptions,
}

/// Input of the `analyze` hook.
///
/// The scanned module is already populated when the hook runs.
pub struct AnalyzeContext<'a> {
    pub graph: &'a mut ModuleGraph,
    /// Relative path of the scanned module.
    pub path: &'a str,
    pub source: &'a str,
    /// Import occurrences as reported by the lexer, in source order.
    pub imports: &'a [ImportRecord],
}

impl AnalyzeContext<'_> {
    pub fn module(&self) -> Option<&Module> {
        self.graph.module(self.path)
    }

    pub fn module_mut(&mut self) -> Option<&mut Module> {
        self.graph.module_mut(self.path)
    }

    pub fn graph(&self) -> &ModuleGraph {
        self.graph
    }
}

impl fmt::Debug for AnalyzeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzeContext")
            .field("path", &self.path)
            .field("imports", &self.imports.len())
            .finish_non_exhaustive()
    }
}

/// A build plugin.
///
/// # Thread Safety
///
/// Plugins must be `Send + Sync` so a build can run on any tokio worker.
/// Hooks take `&self`; plugins that accumulate state across hooks need
/// interior mutability (`parking_lot::Mutex`, atomics).
///
/// # Errors
///
/// A hook returning `Err` aborts the build with [`Error::Plugin`], which
/// carries the plugin name and the hook kind.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique, non-empty name used in logs and error messages.
    fn name(&self) -> &str;

    async fn start(&self, ctx: &StartContext<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    async fn handle_import(&self, ctx: &HandleImportContext<'_>) -> anyhow::Result<ImportAction> {
        let _ = ctx;
        Ok(ImportAction::Continue)
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> anyhow::Result<ResolveOutcome> {
        let _ = ctx;
        Ok(ResolveOutcome::Unresolved)
    }

    async fn analyze(&self, ctx: &mut AnalyzeContext<'_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    async fn end(&self, graph: &mut ModuleGraph) -> anyhow::Result<()> {
        let _ = graph;
        Ok(())
    }
}

/// Plugins of a build, in registration order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }

    /// Reject empty or duplicate plugin names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for name in self.names() {
            if name.is_empty() {
                return Err(Error::config("plugin names must not be empty"));
            }
            if !seen.insert(name) {
                return Err(Error::config(format!(
                    "duplicate plugin name '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    pub(crate) async fn run_start(&self, ctx: &StartContext<'_>) -> Result<()> {
        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), "start hook");
            plugin
                .start(ctx)
                .await
                .map_err(|e| hook_error(plugin.as_ref(), HookKind::Start, e))?;
        }
        Ok(())
    }

    /// Run `handle_import` hooks over `importee`.
    ///
    /// Returns the final importee, or `None` when a hook skipped it.
    pub(crate) async fn run_handle_import(
        &self,
        source: &str,
        importer: &str,
        importee: &str,
    ) -> Result<Option<String>> {
        let mut current = importee.to_string();
        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), importee = %current, "handleImport hook");
            let ctx = HandleImportContext {
                source,
                importer,
                importee: &current,
            };
            let action = plugin
                .handle_import(&ctx)
                .await
                .map_err(|e| hook_error(plugin.as_ref(), HookKind::HandleImport, e))?;

            match action {
                ImportAction::Continue => {}
                ImportAction::Skip => return Ok(None),
                ImportAction::Rewrite(replacement) => current = replacement,
            }
        }
        Ok(Some(current))
    }

    /// First non-empty answer of the `resolve` hooks.
    pub(crate) async fn run_resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<PathBuf>> {
        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), importee = ctx.importee, "resolve hook");
            let outcome = plugin
                .resolve(ctx)
                .await
                .map_err(|e| hook_error(plugin.as_ref(), HookKind::Resolve, e))?;

            if let ResolveOutcome::Resolved(path) = outcome {
                if !path.as_os_str().is_empty() {
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }

    pub(crate) async fn run_analyze(&self, ctx: &mut AnalyzeContext<'_>) -> Result<()> {
        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), path = ctx.path, "analyze hook");
            plugin
                .analyze(ctx)
                .await
                .map_err(|e| hook_error(plugin.as_ref(), HookKind::Analyze, e))?;
        }
        Ok(())
    }

    pub(crate) async fn run_end(&self, graph: &mut ModuleGraph) -> Result<()> {
        for plugin in &self.plugins {
            tracing::trace!(plugin = plugin.name(), "end hook");
            plugin
                .end(graph)
                .await
                .map_err(|e| hook_error(plugin.as_ref(), HookKind::End, e))?;
        }
        Ok(())
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn hook_error(plugin: &dyn Plugin, hook: HookKind, source: anyhow::Error) -> Error {
    Error::Plugin {
        plugin: plugin.name().to_string(),
        hook,
        source,
    }
}
