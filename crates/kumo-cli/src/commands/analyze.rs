//! Analyze command - crawls a package and reports warnings or features

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use walkdir::WalkDir;

use kumo_core::analyzer::{Analyzer, AnalyzerOptions};
use kumo_core::config::{self, Config};
use kumo_core::loader::FsUrlLoader;
use kumo_core::urls::{PackageUrlResolver, PackageUrlResolverOptions};
use kumo_core::warnings::{Severity, Warning};

use crate::output::json;
use crate::output::pretty::PrettyFormatter;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Package-relative entry documents (defaults to kumo.toml entries, or
    /// discovered top-level .html files)
    #[arg(value_name = "ENTRY")]
    pub entries: Vec<String>,

    /// Package root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Exit with a non-zero status when warnings are reported
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Minimum severity to report (error, warning, info)
    #[arg(long, value_name = "LEVEL")]
    pub severity: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl AnalyzeArgs {
    pub async fn run(&self) -> Result<()> {
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("package root {} not found", self.root.display()))?;

        let config = match config::find_config_file(&root) {
            Some(path) => {
                let result = config::load_config(&path)?;
                for warning in &result.warnings {
                    eprintln!("config: {warning}");
                }
                result.config
            }
            None => Config::default(),
        };

        let entries = self.entries_to_analyze(&root, &config)?;
        let min_severity = self.min_severity()?;

        let analyzer = Analyzer::new(AnalyzerOptions {
            loader: Arc::new(FsUrlLoader::new(&root)),
            url_resolver: PackageUrlResolver::new(PackageUrlResolverOptions {
                package_dir: Some(root.clone()),
                component_dir: Some(config.analysis.component_dir.clone()),
                ..Default::default()
            }),
        });

        tracing::info!(entries = entries.len(), root = %root.display(), "analyzing package");

        let mut reported = 0usize;
        for entry in &entries {
            let analysis = analyzer.analyze(&entry.as_str().into()).await?;
            let document = analysis.entry_document();

            match self.format.as_str() {
                "json" => {
                    let export = json::export(document);
                    println!("{}", serde_json::to_string_pretty(&export)?);
                }
                "pretty" | "text" => {
                    let warnings: Vec<&Warning> = document
                        .get_warnings(true)
                        .into_iter()
                        .filter(|w| severity_rank(w.severity) <= severity_rank(min_severity))
                        .collect();
                    reported += warnings.len();
                    let formatter = PrettyFormatter::new(!self.no_color);
                    print!("{}", formatter.format(&analysis, &warnings));
                }
                other => bail!("unknown output format '{other}'"),
            }
        }

        if self.fail_on_warnings && reported > 0 {
            process::exit(1);
        }
        Ok(())
    }

    fn entries_to_analyze(&self, root: &PathBuf, config: &Config) -> Result<Vec<String>> {
        if !self.entries.is_empty() {
            return Ok(self.entries.clone());
        }
        if !config.entry.is_empty() {
            return Ok(config.entry.clone());
        }

        // Fall back to discovering top-level html documents, skipping the
        // components directory and hidden paths.
        let component_dir = &config.analysis.component_dir;
        let mut discovered = Vec::new();
        for entry in WalkDir::new(root)
            .max_depth(2)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && name.as_ref() != component_dir
            })
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "html")
                    .unwrap_or(false)
            {
                if let Ok(relative) = entry.path().strip_prefix(root) {
                    discovered.push(relative.to_string_lossy().into_owned());
                }
            }
        }
        discovered.sort();

        if discovered.is_empty() {
            bail!("no entry documents: pass ENTRY arguments or set `entry` in kumo.toml");
        }
        Ok(discovered)
    }

    fn min_severity(&self) -> Result<Severity> {
        match self.severity.as_deref() {
            None | Some("info") => Ok(Severity::Info),
            Some("warning") => Ok(Severity::Warning),
            Some("error") => Ok(Severity::Error),
            Some(other) => bail!("unknown severity '{other}'"),
        }
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    }
}
