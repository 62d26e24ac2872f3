//! Shared value types passed between the diff resolver, the ignore
//! filter, and the sync orchestrator.

/// The file-level delta between two revisions.
///
/// Paths are project-root-relative with forward slashes. Both sets are
/// sorted and duplicate-free by construction; `upserts` and `removals`
/// are disjoint for any real diff (a path cannot be both added/modified
/// and deleted in the same range).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Files added or modified - to be uploaded
    pub upserts: Vec<String>,
    /// Files deleted - to be removed remotely
    pub removals: Vec<String>,
}

impl ChangeSet {
    pub fn new(upserts: Vec<String>, removals: Vec<String>) -> Self {
        Self {
            upserts: normalize(upserts),
            removals: normalize(removals),
        }
    }

    /// A full-tree listing: everything is an upsert (used by `init`).
    pub fn full_tree(paths: Vec<String>) -> Self {
        Self::new(paths, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.upserts.len() + self.removals.len()
    }
}

fn normalize(mut paths: Vec<String>) -> Vec<String> {
    paths.retain(|p| !p.is_empty());
    paths.sort();
    paths.dedup();
    paths
}

/// Login pair for a remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
