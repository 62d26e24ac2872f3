//! Ignore filter
//!
//! Removes paths matching the project's `ignore` glob patterns from a
//! change set. Shell-glob semantics (`*`, `?`, character classes);
//! patterns are whitespace-trimmed and blank entries are skipped.

use glob::Pattern;

use crate::error::{GitriolError, GitriolResult};
use crate::models::ChangeSet;

/// Compiled ignore patterns for one project.
#[derive(Debug, Default)]
pub struct IgnoreFilter {
    patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    /// Compile a pattern list. An empty list is the identity filter.
    pub fn new(patterns: &[String]) -> GitriolResult<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let pattern =
                Pattern::new(trimmed).map_err(|e| GitriolError::InvalidPattern {
                    pattern: trimmed.to_string(),
                    message: e.to_string(),
                })?;
            compiled.push(pattern);
        }
        Ok(Self { patterns: compiled })
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Filter upserts and removals independently.
    pub fn apply(&self, changes: ChangeSet) -> ChangeSet {
        if self.patterns.is_empty() {
            return changes;
        }
        ChangeSet {
            upserts: self.retain(changes.upserts),
            removals: self.retain(changes.removals),
        }
    }

    fn retain(&self, mut paths: Vec<String>) -> Vec<String> {
        paths.retain(|p| !self.is_ignored(p));
        paths
    }
}
