//! Findings collection
//!
//! The analyzer never owns long-term storage. Records are appended to a
//! [`FindingsCollector`] passed in by the caller; [`KnowledgeBase`] is the
//! in-memory implementation, safe to share between threads analyzing pages
//! concurrently.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::finding::Vulnerability;

/// How records are collapsed when a category is listed at the end of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uniqueness {
    /// Every record.
    #[default]
    None,
    /// First record per URL.
    Url,
    /// First record per URL and highlighted snippet.
    Var,
}

pub trait FindingsCollector: Send + Sync {
    fn append(&self, category: &str, vulnerability: Vulnerability);

    /// Records of `category` in append order.
    fn get(&self, category: &str) -> Vec<Vulnerability>;

    fn unique(&self, category: &str, uniqueness: Uniqueness) -> Vec<Vulnerability> {
        unique_vulnerabilities(self.get(category), uniqueness)
    }
}

pub fn unique_vulnerabilities(
    vulnerabilities: Vec<Vulnerability>,
    uniqueness: Uniqueness,
) -> Vec<Vulnerability> {
    let mut seen: HashSet<(String, Vec<String>)> = HashSet::new();

    vulnerabilities
        .into_iter()
        .filter(|v| match uniqueness {
            Uniqueness::None => true,
            Uniqueness::Url => seen.insert((v.url.clone(), Vec::new())),
            Uniqueness::Var => seen.insert((v.url.clone(), v.highlight.clone())),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: DashMap<String, Vec<Vulnerability>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self, category: &str) -> usize {
        self.entries.get(category).map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.value().is_empty())
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        categories.sort();
        categories
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl FindingsCollector for KnowledgeBase {
    fn append(&self, category: &str, vulnerability: Vulnerability) {
        self.entries
            .entry(category.to_string())
            .or_default()
            .push(vulnerability);
    }

    fn get(&self, category: &str) -> Vec<Vulnerability> {
        self.entries
            .get(category)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }
}
