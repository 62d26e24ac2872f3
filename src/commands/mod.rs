//! Command handlers
//!
//! One module per subcommand. Shared here: loading the project context
//! (config, git handle, log location) and the confirmation gate.

pub mod deploy;
pub mod history;
pub mod init;
pub mod revert;

use std::path::PathBuf;

use is_terminal::IsTerminal;

use crate::config::{repo_dir, ProjectConfig};
use crate::credentials;
use crate::error::{GitriolError, GitriolResult};
use crate::git::GitRepo;
use crate::ignore::IgnoreFilter;
use crate::transport::Connector;

/// Everything a command needs about the project in the current
/// directory.
pub struct ProjectContext {
    pub config: ProjectConfig,
    pub repo: GitRepo,
    pub history_path: PathBuf,
}

impl ProjectContext {
    /// Load from the current working directory.
    pub fn load() -> GitriolResult<Self> {
        let cwd = std::env::current_dir()?;
        let config = ProjectConfig::load(&cwd)?;
        let history_path = config.history_path(&repo_dir()?);
        Ok(Self {
            config,
            repo: GitRepo::new(&cwd),
            history_path,
        })
    }

    /// Compile the project's ignore patterns.
    pub fn ignore_filter(&self) -> GitriolResult<IgnoreFilter> {
        IgnoreFilter::new(&self.config.ignore)
    }

    /// Build a session factory for the configured remote, resolving
    /// credentials on the way.
    pub fn connector(&self) -> GitriolResult<Connector> {
        let url = self.config.remote_url()?;
        let creds = credentials::resolve(&self.config.name, &url)?;
        Ok(Connector::new(&url, creds))
    }
}

/// Gate an operation on operator confirmation. `--yes` waves it
/// through; declining, or having no terminal to ask on, aborts with no
/// side effects.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> GitriolResult<()> {
    if assume_yes {
        return Ok(());
    }
    if !std::io::stdin().is_terminal() {
        eprintln!("{prompt} - no terminal to confirm on (pass --yes to proceed)");
        return Err(GitriolError::Aborted);
    }

    let proceed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| GitriolError::Io(std::io::Error::other(e.to_string())))?;

    if proceed {
        Ok(())
    } else {
        Err(GitriolError::Aborted)
    }
}

/// Abbreviated commit id for progress output.
pub(crate) fn short(revision: &str) -> &str {
    &revision[..revision.len().min(6)]
}
