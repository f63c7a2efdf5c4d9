//! Grep plugins
//!
//! A grep plugin passively inspects responses the host scanner has already
//! fetched and appends what it finds to a shared collector.

pub mod dom_xss;

pub use dom_xss::DomXss;

use crate::collector::FindingsCollector;
use crate::finding::Vulnerability;
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub long_description: &'static str,
}

pub trait GrepPlugin: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;

    /// Analyzes one response. Never fails: anything that cannot be analyzed
    /// is skipped.
    fn grep(&self, response: &dyn Response, collector: &dyn FindingsCollector);

    /// End-of-scan hook returning the records this plugin reports.
    fn end(&self, collector: &dyn FindingsCollector) -> Vec<Vulnerability>;
}
