//! dom_xss grep plugin: flags inline scripts passing browser-controlled values
//! to dangerous JavaScript calls

use tracing::{debug, warn};

use crate::collector::{FindingsCollector, Uniqueness};
use crate::config::{Config, ConfigError};
use crate::finding::{FindingKind, Severity, TaintFinding, Vulnerability};
use crate::plugins::{GrepPlugin, PluginMetadata};
use crate::response::Response;
use crate::scripts::ScriptExtractor;
use crate::taint::TaintAnalyzer;

pub const DOM_XSS_CATEGORY: &str = "dom_xss";
pub const RISKY_CODE_TITLE: &str = "DOM Cross site scripting (Risky JavaScript Code)";
pub const RISKY_FUNCTION_TITLE: &str = "DOM Cross site scripting (Risky JavaScript Function)";

const METADATA: PluginMetadata = PluginMetadata {
    name: "dom_xss",
    description: "Grep every page for traces of DOM XSS.",
    long_description: "This plugin greps every page for traces of DOM XSS.\n\n\
        Two configurable parameters exist:\n    \
        - smart_grep: report sink calls whose arguments reference a\n      \
        user controlled value (document.URL, window.location, ...)\n    \
        - simple_grep: report every sink call, whatever its arguments\n\n\
        An interesting paper about DOM XSS can be found here:\n    \
        - http://www.webappsec.org/projects/articles/071105.shtml",
};

#[derive(Debug, Clone)]
pub struct DomXss {
    extractor: ScriptExtractor,
    analyzer: TaintAnalyzer,
    smart_grep: bool,
    simple_grep: bool,
    uniqueness: Uniqueness,
}

impl Default for DomXss {
    fn default() -> Self {
        Self::new()
    }
}

impl DomXss {
    pub fn new() -> Self {
        Self {
            extractor: ScriptExtractor::default(),
            analyzer: TaintAnalyzer::new(),
            smart_grep: true,
            simple_grep: false,
            uniqueness: Uniqueness::None,
        }
    }

    pub fn with_config(config: &Config) -> Result<Self, ConfigError> {
        let analyzer = TaintAnalyzer::from_patterns(&config.patterns)?
            .with_call_mode(config.scan.calls);

        Ok(Self {
            extractor: ScriptExtractor::new(config.scan.scripts),
            analyzer,
            smart_grep: config.scan.smart_grep,
            simple_grep: config.scan.simple_grep,
            uniqueness: config.report.uniqueness.into(),
        })
    }

    pub fn analyzer(&self) -> &TaintAnalyzer {
        &self.analyzer
    }

    pub fn extractor(&self) -> &ScriptExtractor {
        &self.extractor
    }

    /// Sinks receiving a taint source, across the body's script regions.
    pub fn smart_grep(&self, body: &str) -> Vec<TaintFinding> {
        self.extractor
            .extract(body)
            .flat_map(|region| self.analyzer.analyze(&region))
            .collect()
    }

    /// Every sink call across the body's script regions.
    pub fn simple_grep(&self, body: &str) -> Vec<TaintFinding> {
        self.extractor
            .extract(body)
            .flat_map(|region| self.analyzer.risky_calls(&region))
            .collect()
    }

    /// Findings for `body` under the enabled grep modes.
    pub fn analyze_body(&self, body: &str) -> Vec<TaintFinding> {
        let mut findings = Vec::new();
        if self.smart_grep {
            findings.extend(self.smart_grep(body));
        }
        if self.simple_grep {
            findings.extend(self.simple_grep(body));
        }
        findings
    }

    pub fn build_vulnerability(
        &self,
        response: &dyn Response,
        finding: &TaintFinding,
    ) -> Vulnerability {
        let url = response.url();
        let (title, severity, description) = match finding.kind {
            FindingKind::TaintedSink => (
                RISKY_CODE_TITLE,
                Severity::Low,
                format!(
                    "The URL: \"{}\" has a DOM XSS (Risky JavaScript Code) bug using: \"{}\".",
                    url,
                    finding.highlight()
                ),
            ),
            FindingKind::RiskyCall => (
                RISKY_FUNCTION_TITLE,
                Severity::Information,
                format!(
                    "The URL: \"{}\" calls the risky JavaScript function \"{}\": \"{}\".",
                    url,
                    finding.sink,
                    finding.highlight()
                ),
            ),
        };

        Vulnerability::new(METADATA.name, title, url, response.id())
            .with_severity(severity)
            .with_description(description)
            .with_finding(finding)
    }
}

impl GrepPlugin for DomXss {
    fn metadata(&self) -> &PluginMetadata {
        &METADATA
    }

    fn grep(&self, response: &dyn Response, collector: &dyn FindingsCollector) {
        if !response.is_text_or_html() {
            debug!(url = response.url(), "skipping non text response");
            return;
        }

        let body = match response.body() {
            Ok(body) => body,
            Err(e) => {
                warn!(url = response.url(), error = %e, "skipping undecodable response");
                return;
            }
        };

        let findings = self.analyze_body(body);
        debug!(
            url = response.url(),
            id = response.id(),
            findings = findings.len(),
            "grep finished"
        );

        for finding in &findings {
            collector.append(DOM_XSS_CATEGORY, self.build_vulnerability(response, finding));
        }
    }

    fn end(&self, collector: &dyn FindingsCollector) -> Vec<Vulnerability> {
        collector.unique(DOM_XSS_CATEGORY, self.uniqueness)
    }
}
