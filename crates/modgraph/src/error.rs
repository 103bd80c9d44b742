//! Error types for graph construction.
//!
//! Only a handful of failures abort a build. Unresolvable imports below the
//! entrypoints are not errors at all from the caller's point of view: they
//! are logged, recorded as [`Diagnostic`](crate::Diagnostic)s on the graph,
//! and the offending edge is dropped.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::RuntimeError;

/// The hook kinds a plugin can implement, in the order they fire during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Start,
    HandleImport,
    Resolve,
    Analyze,
    End,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::Start => "start",
            HookKind::HandleImport => "handleImport",
            HookKind::Resolve => "resolve",
            HookKind::Analyze => "analyze",
            HookKind::End => "end",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum Error {
    /// Contradictory or malformed configuration, raised before any file is read.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A plugin hook failed.
    #[error("Plugin '{plugin}' failed in '{hook}' hook: {source}")]
    Plugin {
        plugin: String,
        hook: HookKind,
        #[source]
        source: anyhow::Error,
    },

    /// An entrypoint could not be resolved.
    #[error("Failed to resolve entrypoint '{specifier}': {reason}")]
    EntrypointResolution { specifier: String, reason: String },

    /// A single import could not be resolved.
    ///
    /// `build()` never returns this variant; it is used to format the
    /// diagnostic that replaces the dropped edge.
    #[error("Failed to resolve '{specifier}' from '{importer}': {reason}")]
    Resolution {
        specifier: String,
        importer: String,
        reason: String,
    },

    /// A module's source could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// A module's source could not be lexed.
    #[error("Failed to lex '{}': {message}", .path.display())]
    Lex { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from a plugin hook.
    pub fn is_plugin_error(&self) -> bool {
        matches!(self, Error::Plugin { .. })
    }
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_error_names_plugin_and_hook() {
        let err = Error::Plugin {
            plugin: "rewrite-aliases".to_string(),
            hook: HookKind::HandleImport,
            source: anyhow::anyhow!("boom"),
        };

        let message = err.to_string();
        assert!(message.contains("rewrite-aliases"));
        assert!(message.contains("handleImport"));
        assert!(message.contains("boom"));
        assert!(err.is_plugin_error());
    }

    #[test]
    fn test_read_error_shows_path() {
        let err = Error::Read {
            path: PathBuf::from("/project/src/missing.js"),
            source: RuntimeError::FileNotFound(PathBuf::from("/project/src/missing.js")),
        };
        assert!(err.to_string().contains("/project/src/missing.js"));
    }
}
