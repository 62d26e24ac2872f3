//! gitriol - incremental git-to-remote deployment
//!
//! gitriol keeps a remote FTP/FTPS/SFTP copy of a website in step with a
//! local git repository. It remembers the last deployed revision in a
//! per-project log and, on each deploy, transfers only the files git
//! says changed between that revision and the target.

pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod history;
pub mod ignore;
pub mod models;
pub mod sync;
pub mod transport;

// Re-exports for convenience
pub use config::{repo_dir, ProjectConfig, CONFIG_FILE, REPO_ENV};
pub use error::{GitriolError, GitriolResult};
pub use git::{worktree::with_revision, GitRepo, WorktreePosition};
pub use history::{parse_date, DeploymentLog, DeploymentRecord, RevertSpec};
pub use ignore::IgnoreFilter;
pub use models::{ChangeSet, Credentials};
pub use sync::{sync, SyncReport, UPLOAD_GROUPS};
pub use transport::{transfer_mode, Connect, Connector, Scheme, TransferMode, Transport};
