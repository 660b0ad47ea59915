mod chapter;
mod chapterizer;
mod cli;
mod commands;
mod error;
mod logging;
mod mcp;
mod page_range;
mod pdf;
mod runner;
mod session;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Toc { path } => {
            commands::toc::run(&path)?;
        }
        Commands::Chapters { path, keyword } => {
            commands::chapters::run(&path, &keyword)?;
        }
        Commands::Split {
            path,
            output_dir,
            keyword,
            select,
            all,
            ranges,
        } => {
            let options = commands::split::SplitOptions {
                keyword,
                select,
                all,
                ranges,
            };
            commands::split::run(&path, &output_dir, &options)?;
        }
        Commands::Interactive { path, keyword } => {
            commands::interactive::run(path.as_deref(), &keyword)?;
        }
    }

    Ok(())
}
