//! Remote sync orchestrator
//!
//! Replays a change set against the remote store in three strictly
//! ordered phases: directory creation, parallel upload, removal with
//! empty-directory pruning. Written entirely against the
//! [`Transport`]/[`Connect`] seams; any phase error aborts the sync (and
//! with it the enclosing working-copy transaction) before the
//! deployment log is touched.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::thread;

use crate::error::GitriolResult;
use crate::models::ChangeSet;
use crate::transport::{ancestor_dirs, parent_dir, transfer_mode, Connect, TransferMode, Transport};

/// Fixed upload fan-out, independent of file count.
pub const UPLOAD_GROUPS: usize = 4;

/// What a completed sync did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: usize,
    pub removed: usize,
}

/// Replay `changes` against the remote store reachable through
/// `connector`. Local file content is read from `project_root`, which
/// the caller has pointed at the target revision.
pub fn sync(
    connector: &dyn Connect,
    project_root: &Path,
    changes: &ChangeSet,
) -> GitriolResult<SyncReport> {
    let mut session = connector.connect()?;

    // Phase 1: every distinct parent directory, each chain exactly once.
    // Deepest-first, so one chain call covers all its ancestors; the set
    // records directories known to exist this run and spares the
    // shallower parents their own round-trips.
    let mut known_dirs: HashSet<String> = HashSet::new();
    let parents: BTreeSet<&str> = changes
        .upserts
        .iter()
        .filter_map(|p| parent_dir(p))
        .collect();
    for dir in parents.into_iter().rev() {
        if known_dirs.contains(dir) {
            continue;
        }
        session.ensure_dir_chain(dir)?;
        known_dirs.insert(dir.to_string());
        for ancestor in ancestor_dirs(dir) {
            known_dirs.insert(ancestor);
        }
    }

    // Phase 2: uploads, partitioned into a fixed number of contiguous
    // groups. A single group stays on the main session; more than one
    // gets a connection per worker.
    let groups = partition(&changes.upserts, UPLOAD_GROUPS);
    if groups.len() == 1 {
        for path in &groups[0] {
            upload_one(session.as_mut(), project_root, path)?;
        }
    } else if !groups.is_empty() {
        let results: Vec<GitriolResult<()>> = thread::scope(|scope| {
            let handles: Vec<_> = groups
                .iter()
                .map(|group| {
                    scope.spawn(move || -> GitriolResult<()> {
                        let mut worker = connector.connect()?;
                        for path in group {
                            upload_one(worker.as_mut(), project_root, path)?;
                        }
                        let _ = worker.close();
                        Ok(())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("upload worker panicked"))
                .collect()
        });
        for result in results {
            result?;
        }
    }

    // Phase 3: removals, strictly after every upload succeeded. File
    // deletion failures are fatal; pruning a chain of now-empty
    // directories is cosmetic and stops at the first ancestor that is
    // non-empty or refuses to go.
    for path in &changes.removals {
        println!("remove: {path}");
        session.delete_file(path)?;

        for dir in ancestor_dirs(path) {
            match session.list_dir(&dir) {
                Ok(entries) if entries.is_empty() => {
                    println!("rmdir: {dir}");
                    if session.remove_dir(&dir).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    let _ = session.close();

    Ok(SyncReport {
        uploaded: changes.upserts.len(),
        removed: changes.removals.len(),
    })
}

fn upload_one(session: &mut dyn Transport, project_root: &Path, path: &str) -> GitriolResult<()> {
    let mode = transfer_mode(path);
    match mode {
        TransferMode::Text => println!("text mode: {path}"),
        TransferMode::Binary => println!("binary mode: {path}"),
    }
    session.put(&project_root.join(path), path, mode)
}

/// Deterministic contiguous partition into at most `groups` near-equal
/// slices; earlier groups take the remainder. Never yields an empty
/// group.
pub fn partition<T: Clone>(items: &[T], groups: usize) -> Vec<Vec<T>> {
    if items.is_empty() || groups == 0 {
        return Vec::new();
    }
    let groups = groups.min(items.len());
    let base = items.len() / groups;
    let extra = items.len() % groups;

    let mut out = Vec::with_capacity(groups);
    let mut start = 0;
    for i in 0..groups {
        let len = base + usize::from(i < extra);
        out.push(items[start..start + len].to_vec());
        start += len;
    }
    out
}
