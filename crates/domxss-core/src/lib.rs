//! Passive DOM XSS detection for HTTP response bodies
//!
//! Finds inline scripts that hand browser-controlled values (`document.URL`,
//! `window.location`, ...) straight to dangerous calls (`document.write`,
//! `eval`, ...). Detection is lexical: script regions are located with a
//! pattern, sink calls are matched per sink, and sources are plain substring
//! tests on the captured arguments.

pub mod analysis;
pub mod collector;
pub mod config;
pub mod finding;
pub mod plugins;
pub mod response;
pub mod scripts;
pub mod taint;

pub use analysis::AnalysisEngine;
pub use collector::{FindingsCollector, KnowledgeBase, Uniqueness};
pub use finding::{FindingKind, Severity, TaintFinding, Vulnerability};
pub use plugins::{DomXss, GrepPlugin};
pub use response::{HttpResponse, Response};
pub use scripts::{ScriptExtractor, ScriptRegion, extract_scripts};
pub use taint::{TaintAnalyzer, find_tainted_sinks};
