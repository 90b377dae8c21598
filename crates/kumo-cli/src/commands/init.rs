//! Init command - writes a starter configuration file

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use kumo_core::config::CONFIG_FILENAME;

const DEFAULT_CONFIG: &str = r#"# kumo configuration
# Package-relative entry documents to analyze.
entry = []

[analysis]
# Sibling directory out-of-package imports resolve into.
component_dir = "bower_components"
# Include features from the components directory in query results.
external_packages = false
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create the config file in
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let path = self.dir.join(CONFIG_FILENAME);
        if path.exists() && !self.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        std::fs::write(&path, DEFAULT_CONFIG)?;
        println!("{} {}", "created".green(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            dir: dir.path().to_path_buf(),
            force: false,
        };
        args.run().unwrap();

        let written = std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(written.contains("bower_components"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "entry = []\n").unwrap();

        let args = InitArgs {
            dir: dir.path().to_path_buf(),
            force: false,
        };
        assert!(args.run().is_err());

        let args = InitArgs {
            dir: dir.path().to_path_buf(),
            force: true,
        };
        assert!(args.run().is_ok());
    }
}
