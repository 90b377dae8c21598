pub mod analyze;
pub mod init;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a package and report warnings or exported features
    Analyze(analyze::AnalyzeArgs),
    /// Create a default kumo.toml in the current directory
    Init(init::InitArgs),
}
