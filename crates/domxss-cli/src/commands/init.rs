//! Init command - writes a starter domxss configuration

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use domxss_core::config::CONFIG_FILENAME;
use std::fs;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = r#"# domxss configuration file

# Page extensions picked up when a directory is scanned
# include = ["html", "htm", "xhtml", "shtml"]

[patterns]
# Replace the built-in sink list
# sinks = ["document.write", "document.writeln", "document.execCommand", "document.open", "window.open", "eval", "window.execScript"]

# Replace the built-in source list
# sources = ["document.URL", "document.URLUnencoded", "document.location", "document.referrer", "window.location"]

# Add to the lists in effect
# extra_sinks = ["setTimeout"]
# extra_sources = ["location.hash"]

[scan]
# "first" or "all" script blocks per page
scripts = "first"

# "first" or "all" calls per sink inside a script block
calls = "first"

# Report sinks fed by a known source
smart_grep = true

# Also report every sink call as informational
simple_grep = false

[report]
# Collapse repeated findings: "none", "url" or "var"
uniqueness = "none"
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Directory to write the configuration into
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let config_path = dir.join(CONFIG_FILENAME);

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Config file '{}' already exists. Use --force to overwrite.",
                config_path.display()
            );
        }

        fs::write(&config_path, DEFAULT_CONFIG)?;
        println!(
            "{} Created {} configuration file",
            "✓".green().bold(),
            CONFIG_FILENAME.cyan()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domxss_core::config::{Config, load_config_with_warnings};
    use tempfile::tempdir;

    fn args_for(dir: &std::path::Path, force: bool) -> InitArgs {
        InitArgs {
            force,
            dir: Some(dir.to_path_buf()),
        }
    }

    #[test]
    fn init_creates_config_file() {
        let dir = tempdir().unwrap();

        let result = args_for(dir.path(), false).run();

        assert!(result.is_ok());
        assert!(dir.path().join(CONFIG_FILENAME).exists());
    }

    #[test]
    fn init_fails_if_config_exists_without_force() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "existing").unwrap();

        let result = args_for(dir.path(), false).run();

        assert!(result.is_err());
        let content = fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(content, "existing");
    }

    #[test]
    fn init_with_force_overwrites_existing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "existing").unwrap();

        let result = args_for(dir.path(), true).run();

        assert!(result.is_ok());
        let content = fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(content.contains("[scan]"));
    }

    #[test]
    fn default_config_matches_built_in_defaults() {
        let dir = tempdir().unwrap();
        args_for(dir.path(), false).run().unwrap();

        let result = load_config_with_warnings(&dir.path().join(CONFIG_FILENAME)).unwrap();

        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.config, Config::default());
    }

    #[test]
    fn default_config_is_valid_toml() {
        let value: toml::Value = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(value.get("patterns").is_some());
        assert!(value.get("report").is_some());
    }
}
