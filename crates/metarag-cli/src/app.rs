//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metarag")]
#[command(
    author,
    version,
    about = "Metadata-filtered retrieval over technical documentation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output (pipeline stages are logged at info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to $METARAG_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the sample queries with and without metadata filtering
    Demo(DemoArgs),

    /// Run one metadata-filtered query
    Query(QueryArgs),

    /// Show the filter criteria extracted from a query
    Filters(FiltersArgs),

    /// Show the metadata extracted for each document
    Metadata(MetadataArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Number of results per query
    #[arg(short = 'n', default_value = "2")]
    pub limit: usize,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// JSON or YAML file with documents (defaults to the built-in samples)
    #[arg(long)]
    pub docs: Option<PathBuf>,

    /// Number of results
    #[arg(short = 'n')]
    pub limit: Option<usize>,

    /// Minimum score threshold
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Drop the least specific filter and retry once when nothing matches
    #[arg(long)]
    pub broaden: bool,

    /// Search the whole corpus without metadata filtering
    #[arg(long)]
    pub no_filter: bool,
}

#[derive(Args)]
pub struct FiltersArgs {
    /// Query to analyze
    #[arg(required = true)]
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct MetadataArgs {
    /// JSON or YAML file with documents (defaults to the built-in samples)
    #[arg(long)]
    pub docs: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
