//! Cutline CLI
//!
//! # Usage
//!
//! ```bash
//! cutline export input.mp4 -o out.mp4 --clip 10,50 --clip 70,90 --speed 2 --resolution 720p
//! cutline inspect input.mp4 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::error;

use cutline::cli::{commands, Cli, Commands};
use cutline::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Export(args) => commands::run_export(args).await,
        Commands::Inspect(args) => commands::run_inspect(args).await,
        Commands::Thumbs(args) => commands::run_thumbs(args).await,
    };

    if let Err(error) = &result {
        error!("{:#}", error);
    }
    result
}
