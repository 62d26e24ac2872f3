//! Working-copy transaction
//!
//! The sync step reads files from the local tree, so the tree must be
//! pointed at the target revision for the duration of the upload and
//! then put back exactly as found. `with_revision` is that scoped
//! acquisition: precondition check, detached checkout, action, and an
//! unconditional restore on every exit path.

use super::{GitRepo, WorktreePosition};
use crate::error::{GitriolError, GitriolResult};

/// Run `action` with the working tree checked out at `target`.
///
/// - A dirty tracked tree is a fatal precondition failure; nothing is
///   touched.
/// - If the tree already sits at `target`, the action runs with no
///   switch and no restore.
/// - Otherwise the original symbolic position is captured, the tree is
///   detached at `target`, and after the action - succeeded, failed or
///   panicked - the position is restored and the tree hard-reset.
/// - A restore failure wins over any action failure: the operator must
///   hear about the detached tree first.
pub fn with_revision<T, F>(repo: &GitRepo, target: &str, action: F) -> GitriolResult<T>
where
    F: FnOnce() -> GitriolResult<T>,
{
    if !repo.is_clean()? {
        return Err(GitriolError::DirtyWorkTree);
    }

    let head = repo.resolve_revision("HEAD")?;
    if head == target {
        return action();
    }

    let position = repo.position()?;
    repo.checkout_detached(target)?;

    let mut guard = RestoreGuard {
        repo,
        position,
        restored: false,
    };
    let result = action();

    if let Err(restore_err) = guard.restore_now() {
        return Err(GitriolError::RestoreFailed {
            position: guard.position.to_string(),
            message: restore_err.to_string(),
        });
    }

    result
}

/// Puts the tree back on drop, so an unwinding action cannot leave it
/// detached. The happy path restores explicitly to report failures.
struct RestoreGuard<'a> {
    repo: &'a GitRepo,
    position: WorktreePosition,
    restored: bool,
}

impl RestoreGuard<'_> {
    fn restore_now(&mut self) -> GitriolResult<()> {
        self.restored = true;
        self.repo.restore(&self.position)
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if !self.restored {
            // Unwinding: best effort, the panic itself carries the report.
            let _ = self.repo.restore(&self.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::TestRepo;
    use std::fs;

    #[test]
    fn refuses_dirty_tree() {
        let t = TestRepo::new();
        t.commit_file("a.txt", "one");
        fs::write(t.dir.path().join("a.txt"), "edited").unwrap();

        let err = with_revision(&t.repo, "HEAD", || Ok(())).unwrap_err();
        assert!(matches!(err, GitriolError::DirtyWorkTree));
    }

    #[test]
    fn passes_through_when_already_at_target() {
        let t = TestRepo::new();
        let rev = t.commit_file("a.txt", "one");

        let ran = with_revision(&t.repo, &rev, || Ok("done")).unwrap();
        assert_eq!(ran, "done");
        // Still on the branch, not detached.
        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Branch("main".to_string())
        );
    }

    #[test]
    fn switches_for_action_and_restores_branch() {
        let t = TestRepo::new();
        let old = t.commit_file("a.txt", "one");
        t.commit_file("a.txt", "two");

        let seen = with_revision(&t.repo, &old, || {
            // The tree must hold the old content while the action runs.
            Ok(fs::read_to_string(t.dir.path().join("a.txt")).unwrap())
        })
        .unwrap();

        assert_eq!(seen, "one");
        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Branch("main".to_string())
        );
        assert_eq!(
            fs::read_to_string(t.dir.path().join("a.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn restores_even_when_action_fails() {
        let t = TestRepo::new();
        let old = t.commit_file("a.txt", "one");
        t.commit_file("a.txt", "two");

        let err = with_revision(&t.repo, &old, || {
            Err::<(), _>(GitriolError::Transfer {
                path: "a.txt".to_string(),
                message: "boom".to_string(),
            })
        })
        .unwrap_err();

        // The action's own error survives (restore worked)...
        assert!(matches!(err, GitriolError::Transfer { .. }));
        // ...and the tree is back where it started.
        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Branch("main".to_string())
        );
        assert_eq!(
            fs::read_to_string(t.dir.path().join("a.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn restores_when_action_panics() {
        let t = TestRepo::new();
        let old = t.commit_file("a.txt", "one");
        t.commit_file("a.txt", "two");

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = with_revision(&t.repo, &old, || -> GitriolResult<()> {
                panic!("upload worker died")
            });
        }));

        assert!(unwound.is_err());
        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Branch("main".to_string())
        );
        assert_eq!(
            fs::read_to_string(t.dir.path().join("a.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn restores_detached_starting_point() {
        let t = TestRepo::new();
        let first = t.commit_file("a.txt", "one");
        let second = t.commit_file("a.txt", "two");

        t.repo.checkout_detached(&second).unwrap();
        with_revision(&t.repo, &first, || Ok(())).unwrap();

        assert_eq!(
            t.repo.position().unwrap(),
            WorktreePosition::Detached(second)
        );
    }
}
