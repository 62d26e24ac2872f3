//! Error types for gitriol
//!
//! Uses `thiserror` for library errors; `anyhow` appears only at the
//! binary edge in `main.rs`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gitriol operations
pub type GitriolResult<T> = Result<T, GitriolError>;

/// Main error type for gitriol operations
#[derive(Error, Debug)]
pub enum GitriolError {
    /// No `gitriol.yml` in the working directory
    #[error("not a gitriol project: no gitriol.yml in {}", .dir.display())]
    NotAProject { dir: PathBuf },

    /// Config file exists but cannot be used
    #[error("invalid config {}: {message}", .file.display())]
    InvalidConfig { file: PathBuf, message: String },

    /// Deployment log file missing - project was never initialized
    #[error("no deployment history for '{name}' in {} - run 'gitriol init' first", .repo_dir.display())]
    HistoryNotFound { name: String, repo_dir: PathBuf },

    /// Deployment log exists but holds no records
    #[error("deployment history for '{name}' is empty - run 'gitriol init' first")]
    NothingDeployed { name: String },

    /// Revert request points before the first recorded deployment
    #[error("nothing to revert to for '{request}'")]
    NothingToRevert { request: String },

    /// Local working tree has uncommitted changes
    #[error("working tree has uncommitted changes - commit or stash them first")]
    DirtyWorkTree,

    /// Restoring the working tree after a deployment failed.
    ///
    /// The tree is likely left detached; this is reported as-is and never
    /// replaced by the sync error that may have preceded it.
    #[error("FAILED to restore working tree to '{position}': {message} - the tree may be left detached, restore it manually")]
    RestoreFailed { position: String, message: String },

    /// A git subprocess failed
    #[error("git {args} failed: {message}")]
    Git { args: String, message: String },

    /// A revision alias could not be resolved
    #[error("unknown revision '{alias}'")]
    RevisionNotFound { alias: String },

    /// Could not open a session against the remote host
    #[error("cannot connect to {host}: {message}")]
    Connect { host: String, message: String },

    /// A single transfer failed; fatal to the whole sync
    #[error("transfer failed for '{path}': {message}")]
    Transfer { path: String, message: String },

    /// Credentials could not be resolved without a terminal
    #[error("no credentials for '{name}' and stdin is not a terminal - embed them in the remote URI or add them to the password store")]
    NoCredentials { name: String },

    /// User declined a confirmation prompt
    #[error("aborted by user")]
    Aborted,

    /// Invalid revert argument (neither a step count nor a date)
    #[error("'{input}' is not a step count or a date")]
    InvalidRevertSpec { input: String },

    /// Invalid ignore pattern in the project config
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Remote URI parsing error
    #[error("invalid remote URI: {0}")]
    Url(#[from] url::ParseError),

    /// FTP protocol error
    #[error("FTP error: {0}")]
    Ftp(#[from] suppaftp::FtpError),

    /// SSH/SFTP protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),
}
