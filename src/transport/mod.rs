//! Remote transport abstraction
//!
//! One capability set - directory-chain creation, text/binary upload,
//! file deletion, directory listing, empty-directory removal -
//! implemented per protocol and selected once at startup from the remote
//! URI scheme. The sync orchestrator is written against [`Transport`]
//! and [`Connect`] only.

mod ftp;
mod sftp;

use std::path::Path;

use url::Url;

use crate::error::GitriolResult;
use crate::models::Credentials;

pub use ftp::FtpTransport;
pub use sftp::SftpTransport;

/// How a file's bytes travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Newline-translated per the remote text convention
    Text,
    /// Byte-exact copy
    Binary,
}

/// Extensions uploaded in text mode; everything else, including
/// extensionless files, goes binary.
const TEXT_EXTENSIONS: &[&str] = &[
    "css", "csv", "htm", "html", "js", "json", "md", "php", "svg", "txt", "xml", "yaml", "yml",
];

/// Classify a relative path by its extension.
pub fn transfer_mode(path: &str) -> TransferMode {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.trim().to_ascii_lowercase());
    match ext {
        Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => TransferMode::Text,
        _ => TransferMode::Binary,
    }
}

/// One open session against the remote store. Paths are relative to the
/// configured remote root, forward-slash separated.
pub trait Transport: Send {
    /// Create every missing segment from the root down to `dir`.
    /// "Already exists" is success - concurrent workers race on shared
    /// ancestors by design.
    fn ensure_dir_chain(&mut self, dir: &str) -> GitriolResult<()>;

    /// Upload one local file to `remote`.
    fn put(&mut self, local: &Path, remote: &str, mode: TransferMode) -> GitriolResult<()>;

    /// Delete a remote file.
    fn delete_file(&mut self, remote: &str) -> GitriolResult<()>;

    /// List entry names under `dir`, excluding `.` and `..`. An
    /// empty-directory reply is an empty listing, not a fault.
    fn list_dir(&mut self, dir: &str) -> GitriolResult<Vec<String>>;

    /// Remove an empty remote directory.
    fn remove_dir(&mut self, dir: &str) -> GitriolResult<()>;

    /// Politely end the session. Drop covers the failure paths.
    fn close(&mut self) -> GitriolResult<()>;
}

/// Session factory: the seam between the orchestrator and concrete
/// protocols. Upload workers call this to get per-thread connections.
pub trait Connect: Sync {
    fn connect(&self) -> GitriolResult<Box<dyn Transport>>;
}

/// Protocol selected by the remote URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Ftp,
    Ftps,
    Sftp,
}

impl Scheme {
    /// Unrecognized schemes fall back to plain FTP.
    fn from_url(url: &Url) -> Self {
        match url.scheme() {
            "sftp" => Self::Sftp,
            "ftps" => Self::Ftps,
            _ => Self::Ftp,
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Self::Ftp | Self::Ftps => 21,
            Self::Sftp => 22,
        }
    }
}

/// Everything needed to open sessions against one remote endpoint.
#[derive(Debug, Clone)]
pub struct Connector {
    scheme: Scheme,
    host: String,
    port: u16,
    credentials: Credentials,
    root: String,
}

impl Connector {
    pub fn new(url: &Url, credentials: Credentials) -> Self {
        let scheme = Scheme::from_url(url);
        Self {
            scheme,
            host: url.host_str().unwrap_or("localhost").to_string(),
            port: url.port().unwrap_or_else(|| scheme.default_port()),
            credentials,
            root: url.path().to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

impl Connect for Connector {
    fn connect(&self) -> GitriolResult<Box<dyn Transport>> {
        let addr = (self.host.as_str(), self.port);
        match self.scheme {
            Scheme::Ftp | Scheme::Ftps => Ok(Box::new(FtpTransport::connect(
                addr,
                &self.host,
                &self.credentials,
                &self.root,
                self.scheme == Scheme::Ftps,
            )?)),
            Scheme::Sftp => Ok(Box::new(SftpTransport::connect(
                addr,
                &self.host,
                &self.credentials,
                &self.root,
            )?)),
        }
    }
}

/// Join the configured remote root with a project-relative path. An
/// empty root means "relative to the login directory"; `/` is the server
/// root.
pub(crate) fn join_remote(root: &str, rel: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() {
        if root.starts_with('/') {
            format!("/{rel}")
        } else {
            rel.to_string()
        }
    } else {
        format!("{trimmed}/{rel}")
    }
}

/// Every proper ancestor directory of a file path, deepest first.
/// `a/b/c/f.txt` yields `["a/b/c", "a/b", "a"]`.
pub fn ancestor_dirs(path: &str) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut current = path;
    while let Some(idx) = current.rfind('/') {
        current = &current[..idx];
        if !current.is_empty() {
            dirs.push(current.to_string());
        }
    }
    dirs
}

/// The immediate parent directory of a file path, if any.
pub fn parent_dir(path: &str) -> Option<&str> {
    path.rfind('/').map(|idx| &path[..idx]).filter(|p| !p.is_empty())
}
