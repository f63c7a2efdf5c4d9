//! Configuration loading and parsing for domxss
//!
//! Provides functionality to load and parse `domxss.toml` configuration files.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::collector::Uniqueness;

pub const CONFIG_FILENAME: &str = "domxss.toml";

pub const DEFAULT_PAGE_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "shtml"];

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["include", "patterns", "scan", "report"];
const KNOWN_PATTERNS_KEYS: &[&str] = &["sinks", "sources", "extra_sinks", "extra_sources"];
const KNOWN_SCAN_KEYS: &[&str] = &["scripts", "calls", "smart_grep", "simple_grep"];
const KNOWN_REPORT_KEYS: &[&str] = &["uniqueness"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Invalid {kind} pattern '{pattern}': {reason}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        reason: &'static str,
    },
}

/// Whether to stop at the first match or keep scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    First,
    All,
}

impl ScanMode {
    pub fn limit(&self) -> usize {
        match self {
            ScanMode::First => 1,
            ScanMode::All => usize::MAX,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Page file extensions picked up when scanning a directory.
    pub include: Vec<String>,
    pub patterns: PatternsConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatternsConfig {
    pub sinks: Option<Vec<String>>,
    pub sources: Option<Vec<String>>,
    pub extra_sinks: Vec<String>,
    pub extra_sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub scripts: ScanMode,
    pub calls: ScanMode,
    pub smart_grep: bool,
    pub simple_grep: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scripts: ScanMode::First,
            calls: ScanMode::First,
            smart_grep: true,
            simple_grep: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub uniqueness: UniquenessValue,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessValue {
    #[default]
    None,
    Url,
    Var,
}

impl From<UniquenessValue> for Uniqueness {
    fn from(value: UniquenessValue) -> Self {
        match value {
            UniquenessValue::None => Uniqueness::None,
            UniquenessValue::Url => Uniqueness::Url,
            UniquenessValue::Var => Uniqueness::Var,
        }
    }
}

impl Config {
    /// Extensions treated as pages, falling back to the built-in list.
    pub fn page_extensions(&self) -> Vec<String> {
        if self.include.is_empty() {
            DEFAULT_PAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.include
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
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

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    let sections = [
        ("patterns", KNOWN_PATTERNS_KEYS),
        ("scan", KNOWN_SCAN_KEYS),
        ("report", KNOWN_REPORT_KEYS),
    ];
    for (section, known_keys) in sections {
        if let Some(toml::Value::Table(entries)) = table.get(section) {
            for key in entries.keys() {
                if !known_keys.contains(&key.as_str()) {
                    warnings.push(format!(
                        "Unknown config option in [{}]: '{}'",
                        section, key
                    ));
                }
            }
        }
    }

    warnings
}

/// Loads the nearest config, reporting a broken file as a warning.
pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => match load_config_with_warnings(&path) {
            Ok(result) => result,
            Err(e) => ConfigResult {
                config: Config::default(),
                warnings: vec![format!("{}; using defaults", e)],
            },
        },
        None => ConfigResult::default(),
    }
}
