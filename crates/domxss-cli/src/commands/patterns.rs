//! Patterns command - shows the sinks, sources and scan modes in effect

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use domxss_core::config::{Config, ScanMode, load_config_or_default_with_warnings};
use domxss_core::{DomXss, GrepPlugin};
use std::env;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Directory to resolve domxss.toml from (defaults to the current one)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

impl PatternsArgs {
    pub fn run(&self) -> Result<()> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => env::current_dir()?,
        };

        let config_result = load_config_or_default_with_warnings(&dir);
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }

        print!("{}", render(&config_result.config)?);
        Ok(())
    }
}

fn render(config: &Config) -> Result<String> {
    let plugin = DomXss::with_config(config)?;
    let analyzer = plugin.analyzer();
    let metadata = plugin.metadata();
    let mut out = String::new();

    writeln!(out)?;
    writeln!(out, "{}", metadata.name.bold())?;
    writeln!(out, "  {}", metadata.description)?;

    writeln!(out)?;
    writeln!(out, "  {} ({}):", "Sinks".cyan(), analyzer.sinks_registry().len())?;
    for name in analyzer.sinks_registry().names() {
        writeln!(out, "    {}", name)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {} ({}):",
        "Sources".cyan(),
        analyzer.sources_registry().len()
    )?;
    for expression in analyzer.sources_registry().expressions() {
        writeln!(out, "    {}", expression)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {}: {}",
        "Script blocks".cyan(),
        format_mode(plugin.extractor().mode())
    )?;
    writeln!(
        out,
        "  {}: {}",
        "Calls per sink".cyan(),
        format_mode(analyzer.call_mode())
    )?;
    writeln!(
        out,
        "  {}: {}",
        "Smart grep".cyan(),
        format_switch(config.scan.smart_grep)
    )?;
    writeln!(
        out,
        "  {}: {}",
        "Simple grep".cyan(),
        format_switch(config.scan.simple_grep)
    )?;
    writeln!(out)?;

    Ok(out)
}

fn format_mode(mode: ScanMode) -> &'static str {
    match mode {
        ScanMode::First => "first",
        ScanMode::All => "all",
    }
}

fn format_switch(enabled: bool) -> String {
    if enabled {
        "enabled".green().to_string()
    } else {
        "disabled".red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domxss_core::config::CONFIG_FILENAME;
    use std::fs;
    use tempfile::tempdir;

    fn render_plain(config: &Config) -> String {
        colored::control::set_override(false);
        render(config).unwrap()
    }

    #[test]
    fn default_patterns_are_listed() {
        let output = render_plain(&Config::default());

        assert!(output.contains("Sinks (7):"));
        assert!(output.contains("    document.execCommand"));
        assert!(output.contains("Sources (5):"));
        assert!(output.contains("    document.URLUnencoded"));
        assert!(output.contains("Script blocks: first"));
        assert!(output.contains("Simple grep: disabled"));
    }

    #[test]
    fn extra_patterns_extend_the_defaults() {
        let mut config = Config::default();
        config.patterns.extra_sinks = vec!["setTimeout".to_string()];
        config.scan.scripts = ScanMode::All;

        let output = render_plain(&config);

        assert!(output.contains("Sinks (8):"));
        assert!(output.contains("    setTimeout"));
        assert!(output.contains("Script blocks: all"));
    }

    #[test]
    fn invalid_patterns_are_reported() {
        let mut config = Config::default();
        config.patterns.sinks = Some(vec!["eval".to_string(), "EVAL".to_string()]);

        let err = render(&config).unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn run_reads_config_from_dir() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[patterns]\nsources = [\"location.hash\"]\n",
        )
        .unwrap();

        let args = PatternsArgs {
            dir: Some(dir.path().to_path_buf()),
        };
        assert!(args.run().is_ok());
    }
}
