//! Sink/source correlation over script text
//!
//! Finds sink calls inside a script region and reports every taint source that
//! appears literally in the captured arguments. There is no data-flow tracking:
//! `var x = document.URL; eval(x);` is not reported.

pub mod sinks;
pub mod sources;

pub use sinks::{DEFAULT_SINKS, SinkCall, SinkPattern, SinksRegistry};
pub use sources::{DEFAULT_SOURCES, SourcesRegistry, TaintSource};

use tracing::trace;

use crate::config::{ConfigError, PatternsConfig, ScanMode};
use crate::finding::TaintFinding;
use crate::scripts::ScriptRegion;

#[derive(Debug, Clone)]
pub struct TaintAnalyzer {
    sinks_registry: SinksRegistry,
    sources_registry: SourcesRegistry,
    call_mode: ScanMode,
}

impl Default for TaintAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TaintAnalyzer {
    pub fn new() -> Self {
        Self::with_registries(
            SinksRegistry::with_defaults(),
            SourcesRegistry::with_defaults(),
        )
    }

    pub fn with_registries(
        sinks_registry: SinksRegistry,
        sources_registry: SourcesRegistry,
    ) -> Self {
        Self {
            sinks_registry,
            sources_registry,
            call_mode: ScanMode::First,
        }
    }

    /// Builds the registries from `[patterns]`: explicit lists replace the
    /// defaults, `extra_*` lists are appended afterwards.
    pub fn from_patterns(patterns: &PatternsConfig) -> Result<Self, ConfigError> {
        let mut sinks_registry = match &patterns.sinks {
            Some(names) => SinksRegistry::from_names(names)?,
            None => SinksRegistry::with_defaults(),
        };
        for name in &patterns.extra_sinks {
            sinks_registry.register(name)?;
        }

        let mut sources_registry = match &patterns.sources {
            Some(expressions) => SourcesRegistry::from_expressions(expressions)?,
            None => SourcesRegistry::with_defaults(),
        };
        for expression in &patterns.extra_sources {
            sources_registry.register(expression)?;
        }

        Ok(Self::with_registries(sinks_registry, sources_registry))
    }

    pub fn with_call_mode(mut self, call_mode: ScanMode) -> Self {
        self.call_mode = call_mode;
        self
    }

    /// Sink calls in `region`, grouped by sink in registry order.
    pub fn sink_calls<'a>(&'a self, region: &ScriptRegion<'a>) -> Vec<SinkCall<'a>> {
        self.sinks_registry
            .iter()
            .flat_map(|pattern| pattern.find_calls(region.text, self.call_mode))
            .collect()
    }

    /// One finding per (sink call, source) pair where the source appears in the
    /// call's arguments.
    pub fn analyze(&self, region: &ScriptRegion<'_>) -> Vec<TaintFinding> {
        let mut findings = Vec::new();

        for call in self.sink_calls(region) {
            trace!(sink = call.sink, arguments = call.arguments, "sink call");
            let line = region.line_at(call.offset);
            for source in self.sources_registry.matches_in(call.arguments) {
                findings.push(TaintFinding::tainted(
                    call.sink,
                    source.expression(),
                    call.arguments,
                    call.call,
                    line,
                ));
            }
        }

        findings
    }

    /// Every sink call in `region`, whatever its arguments.
    pub fn risky_calls(&self, region: &ScriptRegion<'_>) -> Vec<TaintFinding> {
        self.sink_calls(region)
            .into_iter()
            .map(|call| {
                TaintFinding::risky_call(
                    call.sink,
                    call.arguments,
                    call.call,
                    region.line_at(call.offset),
                )
            })
            .collect()
    }

    pub fn sinks_registry(&self) -> &SinksRegistry {
        &self.sinks_registry
    }

    pub fn sources_registry(&self) -> &SourcesRegistry {
        &self.sources_registry
    }

    pub fn call_mode(&self) -> ScanMode {
        self.call_mode
    }
}

/// Correlates one script's text against the given sink and source sets,
/// examining the first call of each sink.
pub fn find_tainted_sinks(
    script_text: &str,
    sinks: &SinksRegistry,
    sources: &SourcesRegistry,
) -> Vec<TaintFinding> {
    let region = ScriptRegion {
        text: script_text,
        offset: 0,
        line: 1,
    };
    TaintAnalyzer::with_registries(sinks.clone(), sources.clone()).analyze(&region)
}
