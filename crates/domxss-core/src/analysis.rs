//! Analysis engine driving grep plugins over responses
//!
//! Provides the core analysis functionality for the CLI and other consumers.

use crate::collector::FindingsCollector;
use crate::config::{Config, ConfigError};
use crate::finding::Vulnerability;
use crate::plugins::{DomXss, GrepPlugin};
use crate::response::Response;

pub struct AnalysisEngine {
    plugins: Vec<Box<dyn GrepPlugin>>,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            plugins: vec![Box::new(DomXss::new())],
        }
    }

    pub fn with_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            plugins: vec![Box::new(DomXss::with_config(config)?)],
        })
    }

    pub fn register(&mut self, plugin: Box<dyn GrepPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn GrepPlugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn get_plugin(&self, name: &str) -> Option<&dyn GrepPlugin> {
        self.plugins().find(|p| p.metadata().name == name)
    }

    /// Runs every plugin over one response. Safe to call from several
    /// threads at once with the same engine and collector.
    pub fn grep(&self, response: &dyn Response, collector: &dyn FindingsCollector) {
        for plugin in &self.plugins {
            plugin.grep(response, collector);
        }
    }

    /// Runs every plugin's end-of-scan hook, in registration order.
    pub fn end(&self, collector: &dyn FindingsCollector) -> Vec<Vulnerability> {
        self.plugins
            .iter()
            .flat_map(|plugin| plugin.end(collector))
            .collect()
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
