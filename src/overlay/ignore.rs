//! Ignore rules applied to directory entries before classification.

use std::collections::HashSet;

use glob::Pattern;

use crate::error::Result;

/// Why an entry name was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreMatch<'a> {
    /// The name is on the exact-match list
    Exact,
    /// The name matched this wildcard pattern
    Pattern(&'a str),
}

/// Exact names plus shell-style wildcard patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    exact: HashSet<String>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build rules from configuration entries.
    ///
    /// Entries containing `*`, `?` or `[` are compiled as wildcard patterns,
    /// everything else is matched exactly.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut rules = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            if entry.contains(['*', '?', '[']) {
                rules.add_pattern(entry)?;
            } else {
                rules.add_name(entry);
            }
        }
        Ok(rules)
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.exact.insert(name.into());
    }

    pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
        self.patterns.push(Pattern::new(pattern)?);
        Ok(())
    }

    /// Check a bare entry name. Exact names are tried before patterns.
    pub fn matches(&self, name: &str) -> Option<IgnoreMatch<'_>> {
        if self.exact.contains(name) {
            return Some(IgnoreMatch::Exact);
        }
        self.patterns
            .iter()
            .find(|p| p.matches(name))
            .map(|p| IgnoreMatch::Pattern(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}
