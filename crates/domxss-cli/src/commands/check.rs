//! Check command - greps saved pages for DOM XSS risks

use crate::output::json::JsonFormatter;
use crate::output::pretty::PrettyFormatter;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use domxss_core::config::{Config, ScanMode, load_config_or_default_with_warnings};
use domxss_core::{AnalysisEngine, HttpResponse, KnowledgeBase, Vulnerability};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Saved page or directory of saved pages to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format for findings (pretty, text, json, ndjson)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// URL the analyzed directory was mirrored from, used to name findings
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Scan every <script> block of a page instead of the first one
    #[arg(long)]
    pub all_scripts: bool,

    /// Examine every call of a sink instead of the first one
    #[arg(long)]
    pub all_calls: bool,

    /// Also report sink calls that do not reference a taint source
    #[arg(long)]
    pub simple_grep: bool,

    /// Exit with code 1 when anything is found
    #[arg(long)]
    pub fail_on_findings: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// One page after analysis, kept for rendering source context.
struct AnalyzedPage {
    url: String,
    content: String,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();

        let config_dir = if self.path.is_file() {
            self.path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            self.path.clone()
        };
        let config_result = load_config_or_default_with_warnings(&config_dir);
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        let config = self.apply_overrides(config_result.config);

        let engine = AnalysisEngine::with_config(&config)?;
        let files = discover_pages(&self.path, &config.page_extensions())?;

        if files.is_empty() {
            println!("No pages found.");
            return Ok(());
        }

        info!(pages = files.len(), path = %self.path.display(), "starting scan");

        let kb = KnowledgeBase::new();
        let pages: Vec<AnalyzedPage> = files
            .par_iter()
            .enumerate()
            .filter_map(|(id, file)| {
                let body = match fs::read(file) {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(file = %file.display(), error = %e, "skipping unreadable page");
                        return None;
                    }
                };
                let url = page_url(&self.path, file, self.base_url.as_deref());
                let content = String::from_utf8_lossy(&body).into_owned();
                let response = HttpResponse::new(&url, id as u64, body)
                    .with_content_type(content_type_for(file));
                engine.grep(&response, &kb);
                Some(AnalyzedPage { url, content })
            })
            .collect();

        let findings = engine.end(&kb);
        info!(
            pages = pages.len(),
            findings = findings.len(),
            "scan finished"
        );

        let analyzed_path = self.path.to_string_lossy().to_string();
        match self.format.as_str() {
            "json" => self.output_json(&findings, pages.len(), &analyzed_path),
            "ndjson" => self.output_ndjson(&findings, pages.len(), &analyzed_path)?,
            "text" => self.output_text(&findings),
            "pretty" => self.output_pretty(&findings, &pages),
            other => anyhow::bail!(
                "Invalid format '{}'. Valid values: pretty, text, json, ndjson",
                other
            ),
        }

        if self.fail_on_findings && !findings.is_empty() {
            process::exit(1);
        }

        Ok(())
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if self.all_scripts {
            config.scan.scripts = ScanMode::All;
        }
        if self.all_calls {
            config.scan.calls = ScanMode::All;
        }
        if self.simple_grep {
            config.scan.simple_grep = true;
        }
        debug!(?config, "effective configuration");
        config
    }

    fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }

    fn output_text(&self, findings: &[Vulnerability]) {
        for finding in findings {
            println!(
                "{}:{}: {} [{}]: {}",
                finding.url,
                finding.line,
                finding.severity.as_str(),
                finding.sink.dimmed(),
                finding.description
            );
        }

        if !findings.is_empty() {
            println!();
            println!("Found {} finding(s)", findings.len());
        }
    }

    fn output_json(&self, findings: &[Vulnerability], total_pages: usize, analyzed_path: &str) {
        let formatter = JsonFormatter::new();
        println!("{}", formatter.format(findings, total_pages, analyzed_path));
    }

    fn output_ndjson(
        &self,
        findings: &[Vulnerability],
        total_pages: usize,
        analyzed_path: &str,
    ) -> Result<()> {
        let formatter = JsonFormatter::new();
        let mut stdout = io::stdout().lock();
        formatter.format_ndjson(findings, total_pages, analyzed_path, &mut stdout)?;
        Ok(())
    }

    fn output_pretty(&self, findings: &[Vulnerability], pages: &[AnalyzedPage]) {
        let sources: HashMap<String, String> = pages
            .iter()
            .map(|page| (page.url.clone(), page.content.clone()))
            .collect();
        let formatter = PrettyFormatter::with_sources(sources);
        print!("{}", formatter.format(findings));
    }
}

fn discover_pages(path: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        // An explicitly named file is analyzed whatever its extension.
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_page_file(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    Ok(files)
}

fn is_page_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xhtml" | "xht" => "application/xhtml+xml",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "png" | "jpg" | "jpeg" | "gif" | "ico" | "pdf" | "woff" | "woff2" => {
            "application/octet-stream"
        }
        _ => "text/html",
    }
}

/// Names a page by its position under `root`, either below `base_url` or as
/// a `file://` URL.
fn page_url(root: &Path, file: &Path, base_url: Option<&str>) -> String {
    match base_url {
        Some(base) => {
            let relative = file
                .strip_prefix(root)
                .ok()
                .filter(|rel| !rel.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(file.file_name().unwrap_or_default()));
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            format!("{}/{}", base.trim_end_matches('/'), segments.join("/"))
        }
        None => {
            let absolute = fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
            format!("file://{}", absolute.display())
        }
    }
}
