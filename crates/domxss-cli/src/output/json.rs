//! JSON output formatter for findings
//!
//! Provides structured JSON and NDJSON output formats for programmatic integration.

use domxss_core::{Severity, Vulnerability};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};

#[derive(Serialize)]
pub struct JsonOutput {
    pub version: &'static str,
    pub metadata: JsonMetadata,
    pub summary: JsonSummary,
    pub findings: Vec<JsonFinding>,
}

#[derive(Serialize)]
pub struct JsonMetadata {
    pub domxss_version: &'static str,
    pub working_directory: String,
    pub analyzed_path: String,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub total_pages: usize,
    pub pages_with_findings: usize,
    pub total_findings: usize,
    pub by_severity: SeverityCounts,
}

#[derive(Serialize, Default)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub information: usize,
}

#[derive(Serialize)]
pub struct JsonFinding {
    pub plugin: String,
    pub name: String,
    pub severity: &'static str,
    pub url: String,
    pub response_id: u64,
    pub line: usize,
    pub sink: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub highlight: Vec<String>,
    pub description: String,
}

#[derive(Serialize)]
#[serde(tag = "type")]
pub enum NdjsonRecord {
    #[serde(rename = "metadata")]
    Metadata(JsonMetadata),
    #[serde(rename = "finding")]
    Finding(JsonFinding),
    #[serde(rename = "summary")]
    Summary(JsonSummary),
}

#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(
        &self,
        findings: &[Vulnerability],
        total_pages: usize,
        analyzed_path: &str,
    ) -> String {
        let output = self.build_output(findings, total_pages, analyzed_path);
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_ndjson<W: Write>(
        &self,
        findings: &[Vulnerability],
        total_pages: usize,
        analyzed_path: &str,
        writer: &mut W,
    ) -> io::Result<()> {
        let metadata = self.build_metadata(analyzed_path);
        writeln!(
            writer,
            "{}",
            serde_json::to_string(&NdjsonRecord::Metadata(metadata))?
        )?;

        for finding in findings {
            writeln!(
                writer,
                "{}",
                serde_json::to_string(&NdjsonRecord::Finding(convert_finding(finding)))?
            )?;
        }

        let summary = self.build_summary(findings, total_pages);
        writeln!(
            writer,
            "{}",
            serde_json::to_string(&NdjsonRecord::Summary(summary))?
        )?;

        Ok(())
    }

    fn build_output(
        &self,
        findings: &[Vulnerability],
        total_pages: usize,
        analyzed_path: &str,
    ) -> JsonOutput {
        JsonOutput {
            version: "1.0",
            metadata: self.build_metadata(analyzed_path),
            summary: self.build_summary(findings, total_pages),
            findings: findings.iter().map(convert_finding).collect(),
        }
    }

    fn build_metadata(&self, analyzed_path: &str) -> JsonMetadata {
        JsonMetadata {
            domxss_version: env!("CARGO_PKG_VERSION"),
            working_directory: std::env::current_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            analyzed_path: analyzed_path.to_string(),
        }
    }

    fn build_summary(&self, findings: &[Vulnerability], total_pages: usize) -> JsonSummary {
        let mut by_severity = SeverityCounts::default();
        let mut pages_with_findings: HashSet<&str> = HashSet::new();

        for finding in findings {
            match finding.severity {
                Severity::High => by_severity.high += 1,
                Severity::Medium => by_severity.medium += 1,
                Severity::Low => by_severity.low += 1,
                Severity::Information => by_severity.information += 1,
            }
            pages_with_findings.insert(&finding.url);
        }

        JsonSummary {
            total_pages,
            pages_with_findings: pages_with_findings.len(),
            total_findings: findings.len(),
            by_severity,
        }
    }
}

fn convert_finding(finding: &Vulnerability) -> JsonFinding {
    JsonFinding {
        plugin: finding.plugin_name.clone(),
        name: finding.name.clone(),
        severity: finding.severity.as_str(),
        url: finding.url.clone(),
        response_id: finding.response_id,
        line: finding.line,
        sink: finding.sink.clone(),
        source: finding.source.clone(),
        highlight: finding.highlight.clone(),
        description: finding.description.clone(),
    }
}
