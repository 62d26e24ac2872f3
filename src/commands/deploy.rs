//! Deploy command
//!
//! Moves the remote copy from the last logged revision to a target
//! revision by replaying the git diff between them, then records the
//! new point in the deployment log. The log is only appended after the
//! whole sync succeeded.

use std::path::Path;

use crate::error::{GitriolError, GitriolResult};
use crate::git::worktree::with_revision;
use crate::history::DeploymentLog;
use crate::sync::sync;

use super::{confirm, short, ProjectContext};

pub fn cmd_deploy(revision: Option<&str>, yes: bool) -> GitriolResult<()> {
    let ctx = ProjectContext::load()?;
    let mut log = DeploymentLog::load(&ctx.history_path, &ctx.config.name)?;

    let alias = match revision {
        Some(alias) => alias.to_string(),
        None => match &ctx.config.upload {
            Some(alias) => alias.clone(),
            None => {
                confirm("no revision given and no 'upload' configured; deploy HEAD?", yes)?;
                "HEAD".to_string()
            }
        },
    };
    let target = ctx.repo.resolve_revision(&alias)?;

    let history_path = ctx.history_path.clone();
    deploy_to(&ctx, &mut log, &history_path, &target, true, yes)
}

/// The shared tail of `deploy` and `revert`: everything after the
/// target revision is known. `check_fast_forward` is off for reverts,
/// which go backwards by definition.
pub(crate) fn deploy_to(
    ctx: &ProjectContext,
    log: &mut DeploymentLog,
    history_path: &Path,
    target: &str,
    check_fast_forward: bool,
    yes: bool,
) -> GitriolResult<()> {
    let current = log
        .current_revision()
        .ok_or_else(|| GitriolError::NothingDeployed {
            name: ctx.config.name.clone(),
        })?
        .to_string();

    if current == target {
        println!("already at {}, nothing to deploy", short(target));
        return Ok(());
    }

    if check_fast_forward && !ctx.repo.is_fast_forward(&current, target)? {
        confirm(
            &format!(
                "{} is not a fast-forward of the deployed {}; deploy anyway?",
                short(target),
                short(&current)
            ),
            yes,
        )?;
    }

    println!("changes: {} -> {}", short(&current), short(target));

    let changes = ctx.ignore_filter()?.apply(ctx.repo.diff(&current, target)?);

    if changes.is_empty() {
        // Still a new deployment point; just nothing to transfer.
        println!("no files to transfer");
        log.append(target);
        log.save(history_path)?;
        return Ok(());
    }

    // Fail the dirty-tree precondition before bothering the operator
    // for credentials; with_revision checks it again under the switch.
    if !ctx.repo.is_clean()? {
        return Err(GitriolError::DirtyWorkTree);
    }

    let connector = ctx.connector()?;
    let report = with_revision(&ctx.repo, target, || {
        sync(&connector, ctx.repo.workdir(), &changes)
    })?;

    log.append(target);
    log.save(history_path)?;

    println!(
        "deployed {} ({} uploaded, {} removed)",
        short(target),
        report.uploaded,
        report.removed
    );
    Ok(())
}
