//! Graph construction.
//!
//! [`GraphBuilder`] collects configuration and collaborators, validates them,
//! and hands everything to the traversal driver.
//!
//! # Example
//!
//! ```rust,no_run
//! use modgraph::{ExternalPolicy, GraphBuilder};
//!
//! # async fn example() -> modgraph::Result<()> {
//! let graph = GraphBuilder::new()
//!     .base_path("/path/to/project")
//!     .conditions(["browser", "import"])
//!     .external(ExternalPolicy {
//!         exclude: vec!["lodash".into()],
//!         ..Default::default()
//!     })
//!     .exclude(["**/*.css"])
//!     .build(["src/index.js"])
//!     .await?;
//!
//! for chain in graph.find_import_chains("**/lit-element.js") {
//!     println!("{}", chain.join(" -> "));
//! }
//! # Ok(())
//! # }
//! ```

mod traversal;

use std::path::PathBuf;
use std::sync::Arc;

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{ExternalPolicy, Filters, Pattern};
use crate::graph::ModuleGraph;
use crate::lexer::{Lexer, OxcLexer};
use crate::plugin::{Plugin, PluginRegistry};
use crate::resolver::{NodeResolver, Resolver, ResolverOptions};
use crate::runtime::{NativeRuntime, Runtime};

use traversal::Traversal;

/// Export conditions used when none are configured.
pub const DEFAULT_CONDITIONS: &[&str] = &["node", "import"];

/// What to do when a module below the entrypoints cannot be read or lexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanErrorPolicy {
    /// Fail the build.
    #[default]
    Abort,
    /// Record a diagnostic, leave the module unpopulated and continue.
    Skip,
}

/// Build configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory module paths are made relative to. Defaults to the
    /// runtime's working directory.
    pub base_path: Option<PathBuf>,
    pub conditions: Vec<String>,
    pub external: ExternalPolicy,
    /// Matched against resolved dependency paths.
    pub exclude: Vec<Pattern>,
    pub ignore_dynamic_imports: bool,
    /// Modules kept as leaf edges but never scanned.
    pub foreign_modules: Vec<Pattern>,
    /// Specifiers whose identity is the specifier itself.
    pub virtual_modules: Vec<Pattern>,
    pub plugins: PluginRegistry,
    pub resolver_options: ResolverOptions,
    pub scan_error_policy: ScanErrorPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            conditions: DEFAULT_CONDITIONS.iter().map(|c| c.to_string()).collect(),
            external: ExternalPolicy::default(),
            exclude: Vec::new(),
            ignore_dynamic_imports: false,
            foreign_modules: Vec::new(),
            virtual_modules: Vec::new(),
            plugins: PluginRegistry::new(),
            resolver_options: ResolverOptions::default(),
            scan_error_policy: ScanErrorPolicy::default(),
        }
    }
}

/// Builds a [`ModuleGraph`] from one or more entrypoints.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    config: BuildConfig,
    runtime: Option<Arc<dyn Runtime>>,
    lexer: Option<Arc<dyn Lexer>>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: BuildConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Directory module ids are relative to.
    ///
    /// With the default resolver following symlinks, the path is
    /// canonicalized before the build so ids match the resolved real paths.
    /// A custom resolver gets the path as given.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_path = Some(path.into());
        self
    }

    /// Replace the export conditions.
    pub fn conditions(mut self, conditions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn external(mut self, policy: ExternalPolicy) -> Self {
        self.config.external = policy;
        self
    }

    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<Pattern>>) -> Self {
        self.config
            .exclude
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn ignore_dynamic_imports(mut self, ignore: bool) -> Self {
        self.config.ignore_dynamic_imports = ignore;
        self
    }

    pub fn foreign_modules(mut self, patterns: impl IntoIterator<Item = impl Into<Pattern>>) -> Self {
        self.config
            .foreign_modules
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn virtual_modules(mut self, patterns: impl IntoIterator<Item = impl Into<Pattern>>) -> Self {
        self.config
            .virtual_modules
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Register a plugin. Hooks run in registration order.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.config.plugins.add(Arc::new(plugin));
        self
    }

    pub fn plugin_arc(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.config.plugins.add(plugin);
        self
    }

    pub fn resolver_options(mut self, options: ResolverOptions) -> Self {
        self.config.resolver_options = options;
        self
    }

    pub fn on_scan_error(mut self, policy: ScanErrorPolicy) -> Self {
        self.config.scan_error_policy = policy;
        self
    }

    /// Set the runtime for filesystem reads. Defaults to [`NativeRuntime`].
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Defaults to [`OxcLexer`].
    pub fn lexer(mut self, lexer: Arc<dyn Lexer>) -> Self {
        self.lexer = Some(lexer);
        self
    }

    /// Defaults to a [`NodeResolver`] built from the resolver options.
    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the graph.
    ///
    /// Configuration is validated before any file is read. Fails when an
    /// entrypoint cannot be resolved, when a plugin hook fails, or when a
    /// module cannot be read or lexed under [`ScanErrorPolicy::Abort`].
    pub async fn build(
        self,
        entrypoints: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<ModuleGraph> {
        let entrypoints: Vec<String> = entrypoints.into_iter().map(Into::into).collect();
        if entrypoints.is_empty() {
            return Err(Error::config("at least one entrypoint is required"));
        }

        let filters = Filters::compile(
            &self.config.exclude,
            &self.config.foreign_modules,
            &self.config.virtual_modules,
            &self.config.external,
        )?;
        self.config.plugins.validate()?;

        let runtime = self
            .runtime
            .unwrap_or_else(|| Arc::new(NativeRuntime::new()));
        let lexer = self.lexer.unwrap_or_else(|| Arc::new(OxcLexer::new()));
        let follows_symlinks =
            self.resolver.is_none() && !self.config.resolver_options.preserve_symlinks;
        let resolver = self.resolver.unwrap_or_else(|| {
            Arc::new(NodeResolver::new(self.config.resolver_options.clone()))
        });

        let cwd = runtime
            .get_cwd()
            .map_err(|e| Error::config(format!("cannot determine base path: {}", e)))?;
        let mut base_path = match &self.config.base_path {
            Some(path) if path.is_absolute() => path.clean(),
            Some(path) => cwd.join(path).clean(),
            None => cwd,
        };
        // The default resolver returns real paths; module ids must be relative
        // to the real base directory as well.
        if follows_symlinks {
            if let Ok(real) = tokio::fs::canonicalize(&base_path).await {
                base_path = real;
            }
        }

        let traversal = Traversal {
            config: &self.config,
            filters,
            runtime: runtime.as_ref(),
            lexer: lexer.as_ref(),
            resolver: resolver.as_ref(),
            graph: ModuleGraph::new(base_path.clone()),
            base_path,
            pending: Default::default(),
            queued: Default::default(),
        };
        traversal.run(&entrypoints).await
    }
}

/// Build a module graph with the default collaborators.
pub async fn create_module_graph(
    entrypoints: impl IntoIterator<Item = impl Into<String>>,
    config: BuildConfig,
) -> Result<ModuleGraph> {
    GraphBuilder::from_config(config).build(entrypoints).await
}
