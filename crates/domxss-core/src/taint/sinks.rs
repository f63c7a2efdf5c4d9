//! Sink registry for dangerous JavaScript calls
//!
//! Every sink name gets its own matcher of the form `<name> *( <args> )`. The
//! name is matched case-insensitively and the argument capture is non-greedy,
//! stopping at the first `)` on the same line. Nested parentheses therefore
//! truncate the captured arguments; this is a lexical heuristic, not a parser.

use regex::Regex;

use crate::config::{ConfigError, ScanMode};

pub const DEFAULT_SINKS: &[&str] = &[
    "document.write",
    "document.writeln",
    "document.execCommand",
    "document.open",
    "window.open",
    "eval",
    "window.execScript",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkCall<'a> {
    pub sink: &'a str,
    pub arguments: &'a str,
    /// Whole matched call text, from the sink name to the closing `)`.
    pub call: &'a str,
    /// Byte offset of `call` within the searched text.
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct SinkPattern {
    name: String,
    matcher: Regex,
}

impl SinkPattern {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidPattern {
                kind: "sink",
                pattern: name.to_string(),
                reason: "pattern is empty",
            });
        }

        let matcher = Regex::new(&format!(r"(?i){} *\((.*?)\)", regex::escape(name))).map_err(
            |_| ConfigError::InvalidPattern {
                kind: "sink",
                pattern: name.to_string(),
                reason: "pattern does not compile",
            },
        )?;

        Ok(Self {
            name: name.to_string(),
            matcher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls of this sink within `script`, in source order.
    pub fn find_calls<'a>(
        &'a self,
        script: &'a str,
        mode: ScanMode,
    ) -> impl Iterator<Item = SinkCall<'a>> + 'a {
        self.matcher
            .captures_iter(script)
            .take(mode.limit())
            .filter_map(move |caps| {
                let call = caps.get(0)?;
                let arguments = caps.get(1)?;
                Some(SinkCall {
                    sink: &self.name,
                    arguments: arguments.as_str(),
                    call: call.as_str(),
                    offset: call.start(),
                })
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SinksRegistry {
    patterns: Vec<SinkPattern>,
}

impl SinksRegistry {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::from_names(DEFAULT_SINKS.iter().copied()).expect("Invalid default sink pattern")
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Adds a sink at the end of the set. Names are compared
    /// case-insensitively, like the matchers themselves.
    pub fn register(&mut self, name: &str) -> Result<(), ConfigError> {
        let pattern = SinkPattern::new(name)?;
        if self
            .patterns
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(&pattern.name))
        {
            return Err(ConfigError::InvalidPattern {
                kind: "sink",
                pattern: pattern.name,
                reason: "pattern is listed twice",
            });
        }
        self.patterns.push(pattern);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SinkPattern> {
        self.patterns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
