//! hwinfoctl - hardware inventory browser
//!
//! Walks the probe tree of this system (or a saved snapshot) and prints it
//! as a labeled tree.

use clap::Parser;
use hwinfo_common::HwinfoError;
use hwinfoctl::cli::{Cli, Commands};
use hwinfoctl::commands::{self, SummaryArgs, TreeArgs};
use hwinfoctl::errors::EXIT_GENERAL_ERROR;
use hwinfoctl::logging;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let kind = e.downcast_ref::<HwinfoError>().map_or("general", HwinfoError::code);
            error!(kind, "{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = commands::load_config(cli.config.as_deref());
    let level = match &config {
        Ok(config) => config.log.level.as_str(),
        Err(_) => "",
    };
    logging::init(cli.verbose, level);
    let config = config?;

    match cli.command {
        Commands::Tree {
            snapshot,
            root,
            exclude,
            json,
            output,
            no_progress,
        } => {
            let args = TreeArgs {
                snapshot,
                root,
                exclude,
                json,
                output,
                no_progress,
            };
            commands::tree(&config, args).await
        }
        Commands::Snapshot { output, root } => {
            commands::snapshot(&config, &output, root.as_deref())
        }
        Commands::Render { file } => commands::render(&config, &file),
        Commands::Summary {
            snapshot,
            devices,
            json,
            output,
        } => {
            let args = SummaryArgs {
                snapshot,
                devices,
                json,
                output,
            };
            commands::summary(&config, args)
        }
        Commands::Excluded { snapshot } => commands::excluded(&config, snapshot.as_deref()),
    }
}
