//! Pretty formatter for human-readable terminal output
//!
//! Displays findings with colors, the offending page line, and a summary.

use colored::{ColoredString, Colorize};
use domxss_core::{Severity, Vulnerability};
use std::collections::{HashMap, HashSet};

pub struct PrettyFormatter {
    sources: HashMap<String, String>,
}

impl PrettyFormatter {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// `sources` maps page URLs to the body that was grepped.
    pub fn with_sources(sources: HashMap<String, String>) -> Self {
        Self { sources }
    }

    pub fn format(&self, findings: &[Vulnerability]) -> String {
        let mut output = String::new();

        for finding in findings {
            output.push_str(&self.format_finding(finding));
            output.push('\n');
        }

        if !findings.is_empty() {
            output.push_str(&self.format_summary(findings));
        }

        output
    }

    fn format_finding(&self, finding: &Vulnerability) -> String {
        let mut lines = Vec::new();

        let severity_str = self.colorize_severity(&finding.severity);
        lines.push(format!(
            "{}[{}]: {}",
            severity_str,
            finding.sink.dimmed(),
            finding.name
        ));
        lines.push(format!(
            "  {} {}:{}",
            "-->".blue(),
            finding.url,
            finding.line
        ));

        let padding = " ".repeat(finding.line.to_string().len());

        if let Some(source_line) = self.get_source_line(&finding.url, finding.line) {
            lines.push(format!("{} {}", padding, "|".blue()));
            lines.push(format!(
                "{} {} {}",
                finding.line.to_string().blue(),
                "|".blue(),
                source_line
            ));

            if let Some((column, len)) = highlight_span(source_line, &finding.highlight) {
                lines.push(format!(
                    "{} {} {}{}",
                    padding,
                    "|".blue(),
                    " ".repeat(column),
                    "^".repeat(len.max(1)).red()
                ));
            }

            lines.push(format!("{} {}", padding, "|".blue()));
        }

        lines.push(format!(
            "{} {} {}",
            padding,
            "=".blue(),
            finding.description
        ));

        lines.join("\n")
    }

    fn colorize_severity(&self, severity: &Severity) -> ColoredString {
        match severity {
            Severity::High => "high".red().bold(),
            Severity::Medium => "medium".yellow().bold(),
            Severity::Low => "low".yellow(),
            Severity::Information => "info".blue().bold(),
        }
    }

    fn get_source_line(&self, url: &str, line: usize) -> Option<&str> {
        self.sources
            .get(url)
            .and_then(|source| source.lines().nth(line.checked_sub(1)?))
    }

    fn format_summary(&self, findings: &[Vulnerability]) -> String {
        let tainted = findings
            .iter()
            .filter(|f| f.severity != Severity::Information)
            .count();
        let informational = findings.len() - tainted;
        let pages: HashSet<&str> = findings.iter().map(|f| f.url.as_str()).collect();

        let tainted_str = if tainted == 1 {
            format!("{} tainted sink", tainted)
        } else {
            format!("{} tainted sinks", tainted)
        };

        let pages_str = if pages.len() == 1 { "page" } else { "pages" };

        format!(
            "\nFound {} in {} {} ({} risky call(s) reported)\n",
            tainted_str.yellow().bold(),
            pages.len().to_string().bold(),
            pages_str,
            informational.to_string().blue()
        )
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Column and width of the first highlighted snippet found on the line.
fn highlight_span(line: &str, highlight: &[String]) -> Option<(usize, usize)> {
    highlight.iter().find_map(|snippet| {
        line.find(snippet.as_str())
            .map(|byte| (line[..byte].chars().count(), snippet.chars().count()))
    })
}
