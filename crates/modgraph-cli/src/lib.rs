//! modgraph CLI - list, locate and trace ES module imports from the terminal.
//!
//! This crate wraps the `modgraph` library in a small command-line tool.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`config`] - Layered configuration: defaults, config file, environment, flags
//! - [`commands`] - `list`, `chains` and `find` implementations
//! - [`error`] - CLI error types and miette conversion
//! - [`logger`] - Structured logging with tracing
//!
//! # Example
//!
//! ```rust,no_run
//! use modgraph_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;

pub use error::{CliError, ConfigError, Result};
