//! FTP / FTPS transport
//!
//! Plain FTP and FTPS share one session type; the FTPS variant upgrades
//! the control connection with native-tls before login.

use std::fs::File;
use std::net::ToSocketAddrs;
use std::path::Path;

use suppaftp::native_tls::TlsConnector;
use suppaftp::types::{FileType, FormatControl};
use suppaftp::{FtpError, NativeTlsConnector, NativeTlsFtpStream, Status};

use crate::error::{GitriolError, GitriolResult};
use crate::models::Credentials;

use super::{join_remote, TransferMode, Transport};

pub struct FtpTransport {
    stream: NativeTlsFtpStream,
    root: String,
}

impl FtpTransport {
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        host: &str,
        credentials: &Credentials,
        root: &str,
        secure: bool,
    ) -> GitriolResult<Self> {
        let connect_err = |message: String| GitriolError::Connect {
            host: host.to_string(),
            message,
        };

        let mut stream =
            NativeTlsFtpStream::connect(addr).map_err(|e| connect_err(e.to_string()))?;

        if secure {
            let tls = TlsConnector::new().map_err(|e| connect_err(e.to_string()))?;
            stream = stream
                .into_secure(NativeTlsConnector::from(tls), host)
                .map_err(|e| connect_err(e.to_string()))?;
        }

        stream
            .login(&credentials.username, &credentials.password)
            .map_err(|e| connect_err(e.to_string()))?;

        Ok(Self {
            stream,
            root: root.to_string(),
        })
    }

    fn full(&self, rel: &str) -> String {
        join_remote(&self.root, rel)
    }
}

/// Whether an error is the "no such file / already exists" reply class
/// rather than a genuine fault.
fn is_file_unavailable(err: &FtpError) -> bool {
    matches!(
        err,
        FtpError::UnexpectedResponse(resp)
            if resp.status == Status::FileUnavailable
                || resp.status == Status::RequestFileActionIgnored
    )
}

impl Transport for FtpTransport {
    fn ensure_dir_chain(&mut self, dir: &str) -> GitriolResult<()> {
        let mut chain = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            if !chain.is_empty() {
                chain.push('/');
            }
            chain.push_str(segment);

            let full = self.full(&chain);
            match self.stream.mkdir(&full) {
                Ok(()) => {}
                // 550 on MKD: the directory is already there (possibly
                // created by a concurrent upload worker).
                Err(ref e) if is_file_unavailable(e) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn put(&mut self, local: &Path, remote: &str, mode: TransferMode) -> GitriolResult<()> {
        let transfer_failed = |message: String| GitriolError::Transfer {
            path: remote.to_string(),
            message,
        };

        let file_type = match mode {
            TransferMode::Text => FileType::Ascii(FormatControl::Default),
            TransferMode::Binary => FileType::Binary,
        };
        self.stream
            .transfer_type(file_type)
            .map_err(|e| transfer_failed(e.to_string()))?;

        let full = self.full(remote);
        let mut reader = File::open(local).map_err(|e| transfer_failed(e.to_string()))?;
        self.stream
            .put_file(&full, &mut reader)
            .map_err(|e| transfer_failed(e.to_string()))?;
        Ok(())
    }

    fn delete_file(&mut self, remote: &str) -> GitriolResult<()> {
        let full = self.full(remote);
        self.stream
            .rm(&full)
            .map_err(|e| GitriolError::Transfer {
                path: remote.to_string(),
                message: e.to_string(),
            })
    }

    fn list_dir(&mut self, dir: &str) -> GitriolResult<Vec<String>> {
        let full = self.full(dir);
        match self.stream.nlst(Some(full.as_str())) {
            Ok(entries) => Ok(entries
                .into_iter()
                .filter_map(|entry| {
                    // Servers may return full paths; keep the last component.
                    let name = entry.rsplit('/').next().unwrap_or(&entry).to_string();
                    (name != "." && name != ".." && !name.is_empty()).then_some(name)
                })
                .collect()),
            // "No matching files" arrives as a 450/550 reply, which is a
            // legitimate empty listing, not a fault.
            Err(ref e) if is_file_unavailable(e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_dir(&mut self, dir: &str) -> GitriolResult<()> {
        let full = self.full(dir);
        self.stream.rmdir(&full)?;
        Ok(())
    }

    fn close(&mut self) -> GitriolResult<()> {
        self.stream.quit()?;
        Ok(())
    }
}
