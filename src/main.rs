//! sgraph CLI entry point

use clap::{Parser, Subcommand};
use sgraph_core::ResultLevel;
use sgraph_query::Direction;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sgraph")]
#[command(about = "Structure and dependency queries over software-element graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Graph document to load (repeatable; the first becomes the default)
    #[arg(short, long = "model", global = true)]
    models: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find elements whose name matches a pattern
    Search {
        pattern: String,
        /// Restrict the search to this subtree
        #[arg(short, long)]
        scope: Option<String>,
        /// Only elements of these types (repeatable)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
    },
    /// Incoming and outgoing dependencies of an element
    Deps {
        element: String,
        #[arg(short, long, default_value = "both")]
        direction: Direction,
        /// raw, file, directory or repository
        #[arg(short, long, default_value = "raw")]
        level: ResultLevel,
        /// Include dependencies of descendants
        #[arg(long)]
        descendants: bool,
        /// Drop edges whose far end is external
        #[arg(long)]
        no_external: bool,
        /// Maximum edges per direction
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Transitive dependency chain from an element
    Chain {
        element: String,
        #[arg(short, long, default_value = "outgoing")]
        direction: Direction,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long)]
        no_external: bool,
    },
    /// Who is affected if an element changes
    Impact {
        element: String,
        #[arg(long)]
        descendants: bool,
        #[arg(long)]
        no_external: bool,
    },
    /// Hierarchy listing below an element
    Structure {
        #[arg(default_value = "/")]
        element: String,
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Dependencies of a subtree, split into internal, incoming and outgoing
    Subtree {
        root: String,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long)]
        no_external: bool,
    },
    /// Usage of external elements, by language and package
    External {
        #[arg(short, long)]
        scope: Option<String>,
    },
    /// Unit-to-unit dependency overview
    Overview {
        #[arg(short, long)]
        scope: Option<String>,
        #[arg(short, long, default_value = "directory")]
        level: ResultLevel,
        #[arg(long, default_value = "1")]
        min_count: usize,
        #[arg(long)]
        include_external: bool,
    },
    /// Details for one or more elements
    Elements {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List loaded models
    Models,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default filter
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("sgraph={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("sgraph v{}", env!("CARGO_PKG_VERSION"));

    let config = config::AppConfig::load(cli.config.as_deref())?;
    let registry = commands::open_registry(&config, &cli.models).await?;
    let output = commands::execute(&cli.command, &registry, &config.query)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
