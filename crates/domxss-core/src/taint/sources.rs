//! Taint source registry
//!
//! Sources are browser expressions an attacker can influence. They are matched
//! as exact, case-sensitive substrings of a sink call's argument text.

use crate::config::ConfigError;

pub const DEFAULT_SOURCES: &[&str] = &[
    "document.URL",
    "document.URLUnencoded",
    "document.location",
    "document.referrer",
    "window.location",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaintSource {
    expression: String,
}

impl TaintSource {
    pub fn new(expression: &str) -> Result<Self, ConfigError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(ConfigError::InvalidPattern {
                kind: "source",
                pattern: expression.to_string(),
                reason: "pattern is empty",
            });
        }
        Ok(Self {
            expression: expression.to_string(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn appears_in(&self, arguments: &str) -> bool {
        arguments.contains(self.expression.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourcesRegistry {
    sources: Vec<TaintSource>,
}

impl SourcesRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::from_expressions(DEFAULT_SOURCES.iter().copied())
            .expect("Invalid default source pattern")
    }

    pub fn from_expressions<I, S>(expressions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for expression in expressions {
            registry.register(expression.as_ref())?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, expression: &str) -> Result<(), ConfigError> {
        let source = TaintSource::new(expression)?;
        if self.sources.contains(&source) {
            return Err(ConfigError::InvalidPattern {
                kind: "source",
                pattern: source.expression,
                reason: "pattern is listed twice",
            });
        }
        self.sources.push(source);
        Ok(())
    }

    /// Sources found in `arguments`, in registry order.
    pub fn matches_in<'a>(&'a self, arguments: &'a str) -> impl Iterator<Item = &'a TaintSource> {
        self.sources.iter().filter(move |s| s.appears_in(arguments))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaintSource> {
        self.sources.iter()
    }

    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.expression())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
