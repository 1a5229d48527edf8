use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod builder;
mod cli;
mod config;
mod error;
mod model;
mod output;
mod planner;
mod progress;
mod prompts;
mod report;
mod retry;
mod runner;
mod search;
mod synthesis;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys live in .env during local development.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing - only show debug logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("reportsmith=debug")
    } else {
        EnvFilter::new("reportsmith=info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Schema => cli::schema::execute(),
    }
}
