//! Error handling for the modgraph CLI.
//!
//! [`CliError`] is what every command returns. Domain errors convert into it
//! via `#[from]`, and [`cli_error_to_miette`] turns it into a report at the
//! edge of `main`.

use std::path::PathBuf;

use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failures while building the module graph
    #[error(transparent)]
    Graph(#[from] modgraph::Error),

    /// `find` matched nothing
    #[error("No module matches '{0}'")]
    NoMatch(String),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file passed with --config doesn't exist
    #[error("Config file not found: {}\n\nHint: Create the file or drop --config to use modgraph.json / modgraph.toml", .0.display())]
    NotFound(PathBuf),

    /// Config sources could not be merged into a valid configuration
    #[error("Invalid configuration: {message}\n\nHint: {hint}")]
    Invalid {
        message: String,
        hint: String,
    },

    /// Base path doesn't exist or can't be accessed
    #[error("Cannot use base path {}: {source}\n\nHint: Pass an existing directory with --base-path", .path.display())]
    BasePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Convert a CliError into a miette report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Graph(e) => graph_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a graph build error into a miette report with a hint.
pub fn graph_error_to_miette(err: modgraph::Error) -> Report {
    match err {
        modgraph::Error::EntrypointResolution { specifier, reason } => miette::miette!(
            "Failed to resolve entrypoint: {}\n{}\n\nHint: Entrypoints are resolved against --base-path",
            specifier,
            reason
        ),
        modgraph::Error::Plugin {
            plugin,
            hook,
            source,
        } => miette::miette!("Plugin '{}' failed in '{}' hook: {:#}", plugin, hook, source),
        modgraph::Error::Lex { path, message } => miette::miette!(
            "Failed to parse {}: {}\n\nHint: Use --on-scan-error skip to continue past unparsable modules",
            path.display(),
            message
        ),
        err => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_has_hint() {
        let err = ConfigError::NotFound(PathBuf::from("missing.toml"));
        let message = err.to_string();
        assert!(message.contains("missing.toml"));
        assert!(message.contains("Hint:"));
    }

    #[test]
    fn test_graph_error_is_transparent() {
        let err: CliError = modgraph::Error::Lex {
            path: PathBuf::from("/p/a.js"),
            message: "Unexpected token".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Failed to lex '/p/a.js': Unexpected token");
    }

    #[test]
    fn test_miette_conversion_keeps_context() {
        let report = cli_error_to_miette(CliError::Graph(modgraph::Error::EntrypointResolution {
            specifier: "./nope.js".to_string(),
            reason: "not found".to_string(),
        }));
        let rendered = format!("{}", report);
        assert!(rendered.contains("./nope.js"));
        assert!(rendered.contains("Hint:"));

        let report = cli_error_to_miette(CliError::NoMatch("*.css".to_string()));
        assert_eq!(format!("{}", report), "No module matches '*.css'");
    }
}
