//! Findings and reportable vulnerability records
//!
//! A [`TaintFinding`] is the raw output of the correlator: one taint source seen
//! inside the arguments of one sink call. A [`Vulnerability`] is what gets handed
//! to the findings collector once the originating response is known.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Information,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Information => "information",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// How a finding was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A taint source appeared inside a sink call's arguments.
    TaintedSink,
    /// A sink call was seen, whatever its arguments.
    RiskyCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaintFinding {
    pub kind: FindingKind,
    pub sink: String,
    /// Matched taint source expression. `None` for risky calls.
    pub source: Option<String>,
    pub arguments: String,
    /// Full matched call text, e.g. `document.write(document.URL)`.
    pub call: String,
    /// 1-based line of the sink call within the page body.
    pub line: usize,
}

impl TaintFinding {
    pub fn tainted(sink: &str, source: &str, arguments: &str, call: &str, line: usize) -> Self {
        Self {
            kind: FindingKind::TaintedSink,
            sink: sink.to_string(),
            source: Some(source.to_string()),
            arguments: arguments.to_string(),
            call: call.to_string(),
            line,
        }
    }

    pub fn risky_call(sink: &str, arguments: &str, call: &str, line: usize) -> Self {
        Self {
            kind: FindingKind::RiskyCall,
            sink: sink.to_string(),
            source: None,
            arguments: arguments.to_string(),
            call: call.to_string(),
            line,
        }
    }

    /// The snippet an analyst should look for in the page.
    pub fn highlight(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.call)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Vulnerability {
    pub plugin_name: String,
    pub name: String,
    pub url: String,
    pub response_id: u64,
    pub severity: Severity,
    pub highlight: Vec<String>,
    pub description: String,
    pub sink: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub line: usize,
}

impl Vulnerability {
    pub fn new(plugin_name: &str, name: &str, url: &str, response_id: u64) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            response_id,
            severity: Severity::Low,
            highlight: Vec::new(),
            description: String::new(),
            sink: String::new(),
            source: None,
            line: 0,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_to_highlight(&mut self, snippet: &str) {
        if !self.highlight.iter().any(|h| h == snippet) {
            self.highlight.push(snippet.to_string());
        }
    }

    pub fn with_finding(mut self, finding: &TaintFinding) -> Self {
        self.add_to_highlight(finding.highlight());
        self.sink = finding.sink.clone();
        self.source = finding.source.clone();
        self.line = finding.line;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_from_information_to_high() {
        assert!(Severity::Information < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn tainted_finding_highlights_source() {
        let finding = TaintFinding::tainted(
            "document.write",
            "document.URL",
            "document.URL",
            "document.write(document.URL)",
            3,
        );
        assert_eq!(finding.highlight(), "document.URL");
        assert_eq!(finding.kind, FindingKind::TaintedSink);
    }

    #[test]
    fn risky_call_highlights_call_text() {
        let finding = TaintFinding::risky_call("eval", "x", "eval(x)", 1);
        assert_eq!(finding.highlight(), "eval(x)");
        assert!(finding.source.is_none());
    }

    #[test]
    fn highlight_is_not_duplicated() {
        let mut vuln = Vulnerability::new("dom_xss", "title", "http://a/", 1);
        vuln.add_to_highlight("document.URL");
        vuln.add_to_highlight("document.URL");
        assert_eq!(vuln.highlight, vec!["document.URL"]);
    }

    #[test]
    fn new_vulnerability_defaults_to_low_severity() {
        let vuln = Vulnerability::new("dom_xss", "title", "http://a/", 1);
        assert_eq!(vuln.severity, Severity::Low);
    }

    #[test]
    fn risky_call_serializes_without_source() {
        let finding = TaintFinding::risky_call("eval", "x", "eval(x)", 2);
        let vuln = Vulnerability::new("dom_xss", "title", "http://a/", 7)
            .with_severity(Severity::Information)
            .with_finding(&finding);

        let value = serde_json::to_value(&vuln).unwrap();
        assert_eq!(value["severity"], "information");
        assert_eq!(value["highlight"][0], "eval(x)");
        assert_eq!(value["line"], 2);
        assert!(value.get("source").is_none());
    }
}
