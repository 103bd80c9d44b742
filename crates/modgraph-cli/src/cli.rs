//! Command-line interface definition.
//!
//! - `modgraph list` - Every module reachable from the entrypoints
//! - `modgraph chains` - Import chains from an entrypoint to a target
//! - `modgraph find` - First module matching a target

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use modgraph::ScanErrorPolicy;

/// modgraph - ES module graph inspection
#[derive(Parser, Debug)]
#[command(
    name = "modgraph",
    version,
    about = "Inspect the ES module graph of a JavaScript/TypeScript project",
    long_about = "modgraph follows static and dynamic imports from one or more entrypoints,\n\
                  resolving them the way Node.js does, and answers questions about the\n\
                  resulting graph: what is reachable, and how a module gets pulled in."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a config file (defaults to modgraph.json or modgraph.toml in the
    /// current directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every module reachable from the entrypoints
    ///
    /// Prints one project-relative path per line, sorted. With --json the
    /// whole graph is printed instead.
    List(ListArgs),

    /// Print every import chain from an entrypoint to a target
    ///
    /// Each chain is printed on its own line as `a.js -> b.js -> target.js`.
    Chains(TargetArgs),

    /// Print the first module matching a target
    Find(TargetArgs),
}

/// Options shared by every command that builds a graph.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Entrypoints to start from, comma separated
    ///
    /// Examples:
    ///   modgraph list --entrypoints src/index.js
    ///   modgraph list --entrypoints src/a.js,src/b.js
    #[arg(
        short,
        long,
        required = true,
        value_delimiter = ',',
        value_name = "FILE"
    )]
    pub entrypoints: Vec<String>,

    /// Directory module paths are reported relative to
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<PathBuf>,

    /// Export conditions for package resolution
    #[arg(long, value_delimiter = ',', value_name = "CONDITION")]
    pub conditions: Vec<String>,

    /// Drop dependencies whose path matches one of these globs
    #[arg(long, value_delimiter = ',', value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Keep matching modules as leaves without scanning them
    #[arg(long, value_delimiter = ',', value_name = "GLOB")]
    pub foreign: Vec<String>,

    /// Treat matching specifiers as virtual modules
    #[arg(long = "virtual", value_delimiter = ',', value_name = "GLOB")]
    pub virtual_modules: Vec<String>,

    /// Drop every bare (package) import
    #[arg(long, conflicts_with = "include_external")]
    pub ignore_external: bool,

    /// Only follow packages matching one of these names or globs
    #[arg(long, value_delimiter = ',', value_name = "PACKAGE")]
    pub include_external: Vec<String>,

    /// Never follow packages matching one of these names or globs
    #[arg(long, value_delimiter = ',', value_name = "PACKAGE")]
    pub exclude_external: Vec<String>,

    /// Do not follow `import()` expressions
    #[arg(long)]
    pub ignore_dynamic_imports: bool,

    /// What to do when a module cannot be read or parsed
    #[arg(long, value_enum, value_name = "MODE")]
    pub on_scan_error: Option<ScanErrorMode>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Print the full graph as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Module path or glob to look for
    #[arg(short, long, value_name = "PATTERN")]
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanErrorMode {
    /// Fail the command
    Abort,
    /// Record a diagnostic and keep going
    Skip,
}

impl From<ScanErrorMode> for ScanErrorPolicy {
    fn from(mode: ScanErrorMode) -> Self {
        match mode {
            ScanErrorMode::Abort => ScanErrorPolicy::Abort,
            ScanErrorMode::Skip => ScanErrorPolicy::Skip,
        }
    }
}
