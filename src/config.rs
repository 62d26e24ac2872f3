//! Project configuration
//!
//! A gitriol project is a directory holding a `gitriol.yml` document:
//!
//! ```yaml
//! name: mysite
//! remote: ftp://deploy@ftp.example.com/htdocs
//! upload: main            # optional default revision alias
//! ignore:                 # optional glob patterns
//!   - "*.tmp"
//!   - "docs/*"
//! ```
//!
//! The config is loaded once per invocation and read-only afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::{GitriolError, GitriolResult};

/// Name of the per-project config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "gitriol.yml";

/// Environment variable naming the deployment-log repository directory.
pub const REPO_ENV: &str = "GITRIOL_REPO";

/// Per-project configuration, owned by the project's working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project identifier; names the deployment log file and the
    /// password-store entry.
    pub name: String,

    /// Remote endpoint URI. The scheme selects the transport (`ftp`,
    /// `ftps`, `sftp`; anything else falls back to plain FTP), userinfo
    /// carries optional credentials, the path is the remote root.
    pub remote: String,

    /// Default revision alias for `deploy` when none is given.
    #[serde(default)]
    pub upload: Option<String>,

    /// Glob patterns excluded from every deployment.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ProjectConfig {
    /// Load the config from `dir/gitriol.yml`.
    pub fn load(dir: &Path) -> GitriolResult<Self> {
        let file = dir.join(CONFIG_FILE);
        if !file.exists() {
            return Err(GitriolError::NotAProject {
                dir: dir.to_path_buf(),
            });
        }

        let content = fs::read_to_string(&file)?;
        let config: Self =
            serde_yaml_ng::from_str(&content).map_err(|e| GitriolError::InvalidConfig {
                file: file.clone(),
                message: e.to_string(),
            })?;

        if config.name.trim().is_empty() {
            return Err(GitriolError::InvalidConfig {
                file,
                message: "'name' must not be empty".to_string(),
            });
        }

        Ok(config)
    }

    /// Parse the remote endpoint. A bare `host/path` without a scheme is
    /// accepted and treated as plain FTP.
    pub fn remote_url(&self) -> GitriolResult<Url> {
        match Url::parse(&self.remote) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Url::parse(&format!("ftp://{}", self.remote))?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Path of this project's deployment log inside the repository dir.
    pub fn history_path(&self, repo_dir: &Path) -> PathBuf {
        repo_dir.join(format!("{}.yml", self.name))
    }
}

/// Directory holding the per-project deployment logs.
///
/// `GITRIOL_REPO` wins when set; otherwise `<data_dir>/gitriol`.
pub fn repo_dir() -> GitriolResult<PathBuf> {
    if let Ok(dir) = std::env::var(REPO_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::data_dir()
        .map(|d| d.join("gitriol"))
        .ok_or_else(|| GitriolError::Io(std::io::Error::other("cannot determine data directory")))
}
