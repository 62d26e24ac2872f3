//! Revert command
//!
//! Resolves a step count or date against the deployment log and feeds
//! the resulting revision through the normal deploy pipeline. The
//! revert itself is recorded as a new deployment, never by rewriting
//! history.

use crate::error::GitriolResult;
use crate::history::{DeploymentLog, RevertSpec};

use super::deploy::deploy_to;
use super::ProjectContext;

pub fn cmd_revert(target: &str, yes: bool) -> GitriolResult<()> {
    let ctx = ProjectContext::load()?;
    let mut log = DeploymentLog::load(&ctx.history_path, &ctx.config.name)?;

    let spec = RevertSpec::parse(target)?;
    let revision = log.revert_target(&spec)?.to_string();

    // Going backwards is never a fast-forward; skip that gate.
    let history_path = ctx.history_path.clone();
    deploy_to(&ctx, &mut log, &history_path, &revision, false, yes)
}
