//! Init command
//!
//! Seeds the remote with the full tree of one revision and starts a
//! fresh single-record deployment log. Re-running on a project that
//! already has a log is confirmation-gated, since it discards the
//! existing history.

use crate::error::GitriolResult;
use crate::git::worktree::with_revision;
use crate::history::DeploymentLog;
use crate::models::ChangeSet;
use crate::sync::sync;

use super::{confirm, short, ProjectContext};

pub fn cmd_init(revision: Option<&str>, yes: bool) -> GitriolResult<()> {
    let ctx = ProjectContext::load()?;

    if DeploymentLog::exists(&ctx.history_path) {
        confirm(
            &format!(
                "deployment history for '{}' already exists; discard it and re-seed?",
                ctx.config.name
            ),
            yes,
        )?;
    }

    let alias = revision
        .map(str::to_string)
        .or_else(|| ctx.config.upload.clone())
        .unwrap_or_else(|| "HEAD".to_string());
    let target = ctx.repo.resolve_revision(&alias)?;

    let tree = ctx.repo.full_tree(&target)?;
    let changes = ctx.ignore_filter()?.apply(ChangeSet::full_tree(tree));

    if changes.is_empty() {
        println!("no files to transfer");
    } else {
        let connector = ctx.connector()?;
        let report = with_revision(&ctx.repo, &target, || {
            sync(&connector, ctx.repo.workdir(), &changes)
        })?;
        println!("uploaded {} files", report.uploaded);
    }

    let mut log = DeploymentLog::empty();
    log.append(&target);
    log.save(&ctx.history_path)?;

    println!("initialized '{}' at {}", ctx.config.name, short(&target));
    Ok(())
}
