//! SFTP transport
//!
//! Password-authenticated SSH session with an SFTP channel. SFTP has no
//! ASCII transfer type, so text mode normalizes CRLF line endings before
//! writing.

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};

use ssh2::{Session, Sftp};

use crate::error::{GitriolError, GitriolResult};
use crate::models::Credentials;

use super::{join_remote, TransferMode, Transport};

pub struct SftpTransport {
    session: Session,
    sftp: Sftp,
    root: String,
}

impl SftpTransport {
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        host: &str,
        credentials: &Credentials,
        root: &str,
    ) -> GitriolResult<Self> {
        let connect_err = |message: String| GitriolError::Connect {
            host: host.to_string(),
            message,
        };

        let tcp = TcpStream::connect(addr).map_err(|e| connect_err(e.to_string()))?;
        let mut session = Session::new().map_err(|e| connect_err(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| connect_err(e.to_string()))?;
        session
            .userauth_password(&credentials.username, &credentials.password)
            .map_err(|e| connect_err(e.to_string()))?;

        let sftp = session.sftp().map_err(|e| connect_err(e.to_string()))?;

        Ok(Self {
            session,
            sftp,
            root: root.to_string(),
        })
    }

    fn full(&self, rel: &str) -> PathBuf {
        PathBuf::from(join_remote(&self.root, rel))
    }
}

/// CRLF -> LF, leaving lone LF and CR bytes alone.
fn normalize_newlines(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}

impl Transport for SftpTransport {
    fn ensure_dir_chain(&mut self, dir: &str) -> GitriolResult<()> {
        let mut chain = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            if !chain.is_empty() {
                chain.push('/');
            }
            chain.push_str(segment);

            let full = self.full(&chain);
            if self.sftp.stat(&full).is_ok() {
                continue;
            }
            if let Err(e) = self.sftp.mkdir(&full, 0o755) {
                // A concurrent worker may have created it between the
                // stat and the mkdir.
                if self.sftp.stat(&full).is_err() {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn put(&mut self, local: &Path, remote: &str, mode: TransferMode) -> GitriolResult<()> {
        let transfer_failed = |message: String| GitriolError::Transfer {
            path: remote.to_string(),
            message,
        };

        let full = self.full(remote);
        let mut target = self
            .sftp
            .create(&full)
            .map_err(|e| transfer_failed(e.to_string()))?;
        let mut source = File::open(local).map_err(|e| transfer_failed(e.to_string()))?;

        match mode {
            TransferMode::Binary => {
                io::copy(&mut source, &mut target).map_err(|e| transfer_failed(e.to_string()))?;
            }
            TransferMode::Text => {
                let mut bytes = Vec::new();
                source
                    .read_to_end(&mut bytes)
                    .map_err(|e| transfer_failed(e.to_string()))?;
                target
                    .write_all(&normalize_newlines(&bytes))
                    .map_err(|e| transfer_failed(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn delete_file(&mut self, remote: &str) -> GitriolResult<()> {
        let full = self.full(remote);
        self.sftp
            .unlink(&full)
            .map_err(|e| GitriolError::Transfer {
                path: remote.to_string(),
                message: e.to_string(),
            })
    }

    fn list_dir(&mut self, dir: &str) -> GitriolResult<Vec<String>> {
        let full = self.full(dir);
        let entries = self.sftp.readdir(&full)?;
        Ok(entries
            .into_iter()
            .filter_map(|(path, _stat)| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .filter(|name| name != "." && name != "..")
            .collect())
    }

    fn remove_dir(&mut self, dir: &str) -> GitriolResult<()> {
        let full = self.full(dir);
        self.sftp.rmdir(&full)?;
        Ok(())
    }

    fn close(&mut self) -> GitriolResult<()> {
        self.session.disconnect(None, "done", None)?;
        Ok(())
    }
}
