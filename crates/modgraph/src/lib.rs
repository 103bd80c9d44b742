//! # modgraph
//!
//! Builds the graph of ES modules reachable from one or more entrypoints.
//!
//! Starting from the entrypoints, every static `import`/`export ... from`
//! and every dynamic `import()` with a static specifier is resolved the way
//! Node resolves ES modules, and the resolved module is scanned in turn.
//! The result is a [`ModuleGraph`]: an adjacency map of module paths
//! relative to the base path, per-module metadata, and a registry of modules
//! reached through package (bare) specifiers.
//!
//! ## Architecture
//!
//! ```text
//!   entrypoints ──▶ GraphBuilder ──▶ Traversal (worklist) ──▶ ModuleGraph
//!                        │                 │
//!                        │     ┌───────────┼─────────────┐
//!                        ▼     ▼           ▼             ▼
//!                    Filters  Lexer     Resolver    PluginRegistry
//!                             (oxc)  (oxc_resolver)  start, handleImport,
//!                                                    resolve, analyze, end
//! ```
//!
//! Every collaborator sits behind a trait ([`Runtime`], [`Lexer`],
//! [`Resolver`], [`Plugin`]) so hosts and tests can swap them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modgraph::GraphBuilder;
//!
//! # async fn example() -> modgraph::Result<()> {
//! let graph = GraphBuilder::new()
//!     .base_path("/path/to/project")
//!     .build(["src/index.js"])
//!     .await?;
//!
//! for path in graph.unique_modules() {
//!     println!("{}", path);
//! }
//!
//! if let Some(module) = graph.get("**/router.js") {
//!     println!("{} is imported by {:?}", module.relative_path, module.imported_by);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Filtering
//!
//! - `exclude` patterns drop edges whose resolved path matches.
//! - `foreign_modules` keep the edge but never scan the module.
//! - `virtual_modules` resolve to the specifier itself, without touching disk.
//! - [`ExternalPolicy`] ignores, includes or excludes packages by root name.
//!
//! Patterns are exact strings, globs, or predicates; see [`filter`].

pub mod builder;
pub mod error;
pub mod filter;
pub mod graph;
pub mod lexer;
pub mod plugin;
pub mod resolver;
pub mod runtime;
pub mod specifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests;

pub use async_trait::async_trait;
pub use builder::{BuildConfig, GraphBuilder, ScanErrorPolicy, create_module_graph};
pub use error::{Error, HookKind, Result};
pub use filter::{ExternalPolicy, Pattern};
pub use graph::{Diagnostic, DiagnosticKind, ExternalModule, Module, ModuleGraph};
pub use lexer::{ImportKind, ImportRecord, LexOutput, Lexer, OxcLexer};
pub use plugin::{
    AnalyzeContext, HandleImportContext, ImportAction, Plugin, PluginRegistry, ResolveContext,
    ResolveOutcome, StartContext,
};
pub use resolver::{NodeResolver, ResolveError, Resolver, ResolverOptions};
pub use runtime::{NativeRuntime, Runtime, RuntimeError, RuntimeResult};
