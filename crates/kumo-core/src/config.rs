//! Configuration loading and parsing
//!
//! Provides functionality to load and parse `kumo.toml` configuration
//! files: the components directory, analysis entry points, and file
//! include/exclude patterns.

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "kumo.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["entry", "include", "exclude", "analysis"];
const KNOWN_ANALYSIS_KEYS: &[&str] = &["component_dir", "external_packages"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Entry documents, package-relative.
    pub entry: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sibling directory out-of-package imports resolve into.
    pub component_dir: String,
    /// Include features from documents under the components directory in
    /// query results.
    pub external_packages: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            component_dir: crate::urls::DEFAULT_COMPONENT_DIR.to_string(),
            external_packages: false,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    Ok(ConfigResult {
        config,
        warnings: detect_unknown_keys(&content),
    })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    for key in table.keys() {
        if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            warnings.push(format!("Unknown configuration key '{key}'"));
        }
    }
    if let Some(toml::Value::Table(analysis)) = table.get("analysis") {
        for key in analysis.keys() {
            if !KNOWN_ANALYSIS_KEYS.contains(&key.as_str()) {
                warnings.push(format!("Unknown configuration key 'analysis.{key}'"));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_bower_components() {
        let config = Config::default();
        assert_eq!(config.analysis.component_dir, "bower_components");
        assert!(!config.analysis.external_packages);
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
entry = ["index.html"]
exclude = ["demo/**"]

[analysis]
component_dir = "node_modules"
external_packages = true
"#,
        )
        .unwrap();
        assert_eq!(config.entry, vec!["index.html"]);
        assert_eq!(config.analysis.component_dir, "node_modules");
        assert!(config.analysis.external_packages);
    }

    #[test]
    fn unknown_keys_are_warned_not_fatal() {
        let warnings = detect_unknown_keys("entry = []\ntypo_key = 1\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("typo_key"));
    }

    #[test]
    fn unknown_analysis_keys_are_warned() {
        let warnings =
            detect_unknown_keys("[analysis]\ncomponent_dir = \"x\"\nmystery = true\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("analysis.mystery"));
    }

    #[test]
    fn load_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "entry = [\"app.html\"]\n").unwrap();

        let result = load_config(&path).unwrap();
        assert_eq!(result.config.entry, vec!["app.html"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "entry = [").unwrap();

        assert!(matches!(
            load_config(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
