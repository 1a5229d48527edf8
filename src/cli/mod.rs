pub mod run;
pub mod schema;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reportsmith")]
#[command(
    author,
    version,
    about = "Multi-section report generator driven by an LLM and web search"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report for a topic
    Run(RunArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Topic to report on
    #[arg(value_name = "TOPIC")]
    pub topic: String,

    /// Path to config file
    #[arg(short, long, default_value = "reportsmith.yaml")]
    pub config: PathBuf,

    /// Override max parallel section tasks
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override output directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Override the per-section search round budget
    #[arg(long)]
    pub max_search_iterations: Option<u32>,

    /// Steer the planner (e.g. "focus on pricing, drop the history section")
    #[arg(long)]
    pub feedback: Option<String>,

    /// Generate and print the section outline without writing anything
    #[arg(long)]
    pub plan_only: bool,

    /// Print the compiled report to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}
