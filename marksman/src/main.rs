// marksman/src/main.rs
//! marksman entry point.
//!
//! Loads `.env`, sets up logging and hands the parsed command line to
//! [`marksman::run`].

use anyhow::Result;
use clap::Parser;

use marksman::cli::Cli;
use marksman::logger;
use marksman::ui::output_format;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the API key may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug, cli.disable_debug));

    if let Err(e) = marksman::run(cli).await {
        output_format::error_msg(format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
