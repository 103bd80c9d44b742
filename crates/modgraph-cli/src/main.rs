//! modgraph - ES module graph inspection from the command line.

use clap::Parser;
use miette::Result;
use modgraph_cli::{cli, commands, error, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let no_color = args.no_color || !logger::should_use_colors();
    logger::init_logger(args.verbose, args.quiet, no_color);

    let config = args.config.as_deref();
    let mut stdout = std::io::stdout().lock();

    let result = match args.command {
        cli::Command::List(list_args) => {
            commands::list_execute(list_args, config, &mut stdout).await
        }
        cli::Command::Chains(target_args) => {
            commands::chains_execute(target_args, config, &mut stdout).await
        }
        cli::Command::Find(target_args) => {
            commands::find_execute(target_args, config, &mut stdout).await
        }
    };

    result.map_err(error::cli_error_to_miette)
}
