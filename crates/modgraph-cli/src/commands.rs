//! Command implementations.
//!
//! Each command builds the graph from its [`GraphArgs`] and writes plain
//! results to `out`, one per line. Logs go to stderr so output stays pipeable.

use std::io::Write;
use std::path::Path;

use modgraph::{ModuleGraph, create_module_graph};
use tracing::{debug, info};

use crate::cli::{GraphArgs, ListArgs, TargetArgs};
use crate::config::ModgraphConfig;
use crate::error::{CliError, Result};

/// Build the graph described by the arguments and config sources.
pub async fn build_graph(args: &GraphArgs, config_path: Option<&Path>) -> Result<ModuleGraph> {
    let entrypoints: Vec<&str> = args
        .entrypoints
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if entrypoints.is_empty() {
        return Err(CliError::InvalidArgument(
            "--entrypoints must name at least one file".to_string(),
        ));
    }

    let cwd = std::env::current_dir()?;
    let config = ModgraphConfig::load(args, config_path, &cwd)?.into_build_config(&cwd)?;
    debug!(base_path = ?config.base_path, conditions = ?config.conditions, "Resolved configuration");

    let graph = create_module_graph(entrypoints, config).await?;
    if !graph.diagnostics().is_empty() {
        info!(
            count = graph.diagnostics().len(),
            "Some imports were dropped, rerun with --verbose for details"
        );
    }
    Ok(graph)
}

/// `modgraph list`
pub async fn list_execute(
    args: ListArgs,
    config_path: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let graph = build_graph(&args.graph, config_path).await?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &graph)?;
        writeln!(out)?;
        return Ok(());
    }

    for module in graph.unique_modules() {
        writeln!(out, "{}", module)?;
    }
    Ok(())
}

/// `modgraph chains`
pub async fn chains_execute(
    args: TargetArgs,
    config_path: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let graph = build_graph(&args.graph, config_path).await?;

    let chains = graph.find_import_chains(args.target.as_str());
    if chains.is_empty() {
        info!(pattern = %args.target, "No import chains found");
    }
    for chain in chains {
        writeln!(out, "{}", chain.join(" -> "))?;
    }
    Ok(())
}

/// `modgraph find`
pub async fn find_execute(
    args: TargetArgs,
    config_path: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let graph = build_graph(&args.graph, config_path).await?;

    let module = graph
        .get(args.target.as_str())
        .ok_or_else(|| CliError::NoMatch(args.target.clone()))?;
    writeln!(out, "{}", module.relative_path)?;
    Ok(())
}
