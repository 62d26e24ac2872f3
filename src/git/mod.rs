//! Git collaborator
//!
//! gitriol treats the version-control system as a black box reached
//! through the `git` binary: alias resolution, three-way file-status
//! diffs, tree listings, fast-forward queries, and working-tree
//! switching. Everything shells out via `std::process::Command` and maps
//! failures into [`GitriolError::Git`].

pub mod worktree;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{GitriolError, GitriolResult};
use crate::models::ChangeSet;

/// Handle on the project's git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: PathBuf,
}

/// The symbolic position of a working tree: a checked-out branch, or a
/// detached commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorktreePosition {
    Branch(String),
    Detached(String),
}

impl fmt::Display for WorktreePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "{name}"),
            Self::Detached(rev) => write!(f, "{rev}"),
        }
    }
}

impl GitRepo {
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn git(&self, args: &[&str]) -> GitriolResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| GitriolError::Git {
                args: args.join(" "),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitriolError::Git {
                args: args.join(" "),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Resolve a human alias (branch, tag, `HEAD`, short id) to a full
    /// commit id. Idempotent: a full id resolves to itself.
    pub fn resolve_revision(&self, alias: &str) -> GitriolResult<String> {
        let spec = format!("{alias}^{{commit}}");
        self.git(&["rev-parse", "--verify", "--quiet", &spec])
            .map(|out| out.trim().to_string())
            .map_err(|_| GitriolError::RevisionNotFound {
                alias: alias.to_string(),
            })
    }

    /// The file-level delta between two revisions: added/modified paths
    /// as upserts, deleted paths as removals. `diff(A, A)` is empty.
    pub fn diff(&self, from: &str, to: &str) -> GitriolResult<ChangeSet> {
        let upserts = self.git(&["diff", "--name-only", "--diff-filter=AM", from, to])?;
        let removals = self.git(&["diff", "--name-only", "--diff-filter=D", from, to])?;

        Ok(ChangeSet::new(
            upserts.lines().map(str::to_string).collect(),
            removals.lines().map(str::to_string).collect(),
        ))
    }

    /// All file paths present at a revision (used by `init`).
    pub fn full_tree(&self, revision: &str) -> GitriolResult<Vec<String>> {
        let listing = self.git(&["ls-tree", "--name-only", "-r", revision])?;
        Ok(listing.lines().map(str::to_string).collect())
    }

    /// True iff `from` is an ancestor of `to` along a single line of
    /// history, i.e. `to`'s merge-base against `from` is `from` itself.
    pub fn is_fast_forward(&self, from: &str, to: &str) -> GitriolResult<bool> {
        let status = Command::new("git")
            .args(["merge-base", "--is-ancestor", from, to])
            .current_dir(&self.workdir)
            .status()
            .map_err(|e| GitriolError::Git {
                args: "merge-base --is-ancestor".to_string(),
                message: e.to_string(),
            })?;

        // Exit 0: ancestor. Exit 1: not an ancestor - a legitimate
        // answer, not a fault. Anything else is a real error.
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(GitriolError::Git {
                args: "merge-base --is-ancestor".to_string(),
                message: format!("unexpected exit status {code:?}"),
            }),
        }
    }

    /// Whether the tracked tree is free of staged or unstaged changes.
    /// Untracked files are fine; a checkout leaves them alone.
    pub fn is_clean(&self) -> GitriolResult<bool> {
        let status = self.git(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(status.trim().is_empty())
    }

    /// Capture the current symbolic position for a later restore.
    pub fn position(&self) -> GitriolResult<WorktreePosition> {
        match self.git(&["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(branch) => Ok(WorktreePosition::Branch(branch.trim().to_string())),
            // Already detached: remember the commit itself.
            Err(_) => Ok(WorktreePosition::Detached(self.resolve_revision("HEAD")?)),
        }
    }

    /// Point the tree at a revision without moving any branch.
    pub fn checkout_detached(&self, revision: &str) -> GitriolResult<()> {
        self.git(&["checkout", "--quiet", "--detach", revision])?;
        Ok(())
    }

    /// Return to a captured position and hard-reset the tree to match.
    pub fn restore(&self, position: &WorktreePosition) -> GitriolResult<()> {
        match position {
            WorktreePosition::Branch(name) => {
                self.git(&["checkout", "--quiet", name])?;
            }
            WorktreePosition::Detached(rev) => {
                self.git(&["checkout", "--quiet", "--detach", rev])?;
            }
        }
        self.git(&["reset", "--hard", "--quiet"])?;
        Ok(())
    }

    /// One-line `git log` subject for a revision, used to decorate the
    /// history listing. Falls back over root commits (`rev~` does not
    /// exist there).
    pub fn one_line_log(&self, revision: &str) -> Option<String> {
        let range = format!("{revision}~..{revision}");
        self.git(&["log", "--pretty=oneline", "--abbrev-commit", &range])
            .or_else(|_| {
                self.git(&["log", "--pretty=oneline", "--abbrev-commit", "-1", revision])
            })
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A throwaway git repository with identity configured, for tests.
    pub struct TestRepo {
        pub dir: TempDir,
        pub repo: GitRepo,
    }

    impl TestRepo {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let repo = GitRepo::new(dir.path());
            run(dir.path(), &["init", "--quiet", "--initial-branch=main"]);
            run(dir.path(), &["config", "user.email", "test@example.com"]);
            run(dir.path(), &["config", "user.name", "Test"]);
            Self { dir, repo }
        }

        pub fn commit_file(&self, path: &str, content: &str) -> String {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, content).unwrap();
            run(self.dir.path(), &["add", "."]);
            run(
                self.dir.path(),
                &["commit", "--quiet", "-m", &format!("add {path}")],
            );
            self.repo.resolve_revision("HEAD").unwrap()
        }

        pub fn remove_file(&self, path: &str) -> String {
            run(self.dir.path(), &["rm", "--quiet", path]);
            run(
                self.dir.path(),
                &["commit", "--quiet", "-m", &format!("remove {path}")],
            );
            self.repo.resolve_revision("HEAD").unwrap()
        }
    }

    fn run(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::TestRepo;
    use super::*;

    #[test]
    fn resolve_revision_is_idempotent() {
        let t = TestRepo::new();
        let rev = t.commit_file("a.txt", "one");

        assert_eq!(t.repo.resolve_revision("HEAD").unwrap(), rev);
        assert_eq!(t.repo.resolve_revision(&rev).unwrap(), rev);
        assert_eq!(t.repo.resolve_revision("main").unwrap(), rev);
    }

    #[test]
    fn resolve_unknown_alias_fails() {
        let t = TestRepo::new();
        t.commit_file("a.txt", "one");
        let err = t.repo.resolve_revision("no-such-ref").unwrap_err();
        assert!(matches!(err, GitriolError::RevisionNotFound { .. }));
    }

    #[test]
    fn diff_splits_upserts_and_removals() {
        let t = TestRepo::new();
        let first = t.commit_file("keep.txt", "v1");
        t.commit_file("new.txt", "added");
        t.commit_file("keep.txt", "v2");
        let last = t.remove_file("new.txt");

        let changes = t.repo.diff(&first, &last).unwrap();
        assert_eq!(changes.upserts, vec!["keep.txt"]);
        assert!(changes.removals.is_empty());

        let mid = t.repo.resolve_revision(&format!("{last}~")).unwrap();
        let changes = t.repo.diff(&mid, &last).unwrap();
        assert!(changes.upserts.is_empty());
        assert_eq!(changes.removals, vec!["new.txt"]);
    }

    #[test]
    fn diff_same_revision_is_empty() {
        let t = TestRepo::new();
        let rev = t.commit_file("a.txt", "one");
        let changes = t.repo.diff(&rev, &rev).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn diff_sets_are_disjoint() {
        let t = TestRepo::new();
        let first = t.commit_file("a.txt", "one");
        t.commit_file("b.txt", "two");
        let last = t.remove_file("a.txt");

        let changes = t.repo.diff(&first, &last).unwrap();
        for path in &changes.upserts {
            assert!(!changes.removals.contains(path));
        }
    }

    #[test]
    fn full_tree_lists_nested_paths() {
        let t = TestRepo::new();
        t.commit_file("a.txt", "one");
        let rev = t.commit_file("dir/sub/b.txt", "two");

        let tree = t.repo.full_tree(&rev).unwrap();
        assert_eq!(tree, vec!["a.txt", "dir/sub/b.txt"]);
    }

    #[test]
    fn fast_forward_linear_history() {
        let t = TestRepo::new();
        let first = t.commit_file("a.txt", "one");
        let second = t.commit_file("a.txt", "two");

        assert!(t.repo.is_fast_forward(&first, &second).unwrap());
        assert!(!t.repo.is_fast_forward(&second, &first).unwrap());
    }

    #[test]
    fn clean_and_dirty_tree() {
        let t = TestRepo::new();
        t.commit_file("a.txt", "one");
        assert!(t.repo.is_clean().unwrap());

        std::fs::write(t.dir.path().join("a.txt"), "edited").unwrap();
        assert!(!t.repo.is_clean().unwrap());
    }

    #[test]
    fn position_on_branch_and_detached() {
        let t = TestRepo::new();
        let rev = t.commit_file("a.txt", "one");

        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Branch("main".to_string())
        );

        t.repo.checkout_detached(&rev).unwrap();
        assert_eq!(t.repo.position().unwrap(), WorktreePosition::Detached(rev));

        t.repo
            .restore(&WorktreePosition::Branch("main".to_string()))
            .unwrap();
        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Branch("main".to_string())
        );
    }

    #[test]
    fn one_line_log_handles_root_commit() {
        let t = TestRepo::new();
        let rev = t.commit_file("a.txt", "one");
        let line = t.repo.one_line_log(&rev).unwrap();
        assert!(line.contains("add a.txt"));
    }
}
