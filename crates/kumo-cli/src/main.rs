//! kumo CLI - Command-line interface for the kumo analyzer
//!
//! Analyzes a web-components package (HTML imports, inline and external
//! scripts, Polymer elements and behaviors) and reports warnings or a JSON
//! description of the discovered features.

mod commands;
mod output;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kumo",
    author,
    version,
    about = "Static analyzer for web-components codebases",
    long_about = "kumo crawls a package's import graph, scans HTML and \
                  ECMAScript sources for elements, mixins, namespaces, \
                  functions and behaviors, and reports structured warnings \
                  or a JSON feature description."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => args.run().await,
        Commands::Init(args) => args.run(),
    }
}
