//! # Report Publishing
//!
//! Writes the rendered page to disk and uploads it to the web host over
//! SFTP. After the upload the remote path is `stat`ed to confirm the file
//! landed; a missing file is reported as [`PublishOutcome::Missing`] rather
//! than an error so the caller can log it and still exit cleanly.
//!
//! Connecting and every blocking SSH call are bounded by the same timeout
//! as the HTTP requests.

use crate::config::PublishConfig;
use ssh2::{CheckResult, KnownHostFileKind, Session};
use std::fs;
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("publish IO: {0}")]
    Io(#[from] io::Error),

    #[error("SSH: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("host key for {0} not accepted")]
    HostKey(String),

    #[error("publish target is not configured (missing {0})")]
    NotConfigured(&'static str),
}

/// Result of an upload that reached the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The remote file exists after the transfer
    Verified,
    /// The transfer completed but the remote file could not be found
    Missing,
}

/// Something that can put a local file somewhere public.
pub trait Publisher {
    fn publish(&self, local: &Path) -> Result<PublishOutcome, PublishError>;

    /// Where the file ends up, for log lines
    fn target(&self) -> String;
}

/// Upload `local` and log the result.
///
/// Upload problems never fail the run: the report already exists locally.
/// Returns the outcome when the transfer completed, `None` when it failed.
pub fn publish_report<P: Publisher>(publisher: &P, local: &Path) -> Option<PublishOutcome> {
    match publisher.publish(local) {
        Ok(PublishOutcome::Verified) => {
            info!(
                "File '{}' successfully uploaded to {}",
                local.display(),
                publisher.target()
            );
            Some(PublishOutcome::Verified)
        }
        Ok(PublishOutcome::Missing) => {
            error!(
                "Failed to upload the file '{}': not found on {} after transfer",
                local.display(),
                publisher.target()
            );
            Some(PublishOutcome::Missing)
        }
        Err(e) => {
            error!("Failed to upload the file '{}': {}", local.display(), e);
            None
        }
    }
}

/// Write the rendered report, replacing any previous one.
pub fn write_report(path: &Path, html: &str) -> Result<(), PublishError> {
    fs::write(path, html)?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Uploads over SFTP with password authentication.
pub struct SftpPublisher {
    host: String,
    port: u16,
    username: String,
    password: String,
    remote_path: PathBuf,
    known_hosts: Option<PathBuf>,
    timeout: Duration,
}

impl SftpPublisher {
    pub fn from_config(config: &PublishConfig, timeout: Duration) -> Result<Self, PublishError> {
        if config.host.is_empty() {
            return Err(PublishError::NotConfigured("publish.host"));
        }
        if config.username.is_empty() {
            return Err(PublishError::NotConfigured("publish.username"));
        }
        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            remote_path: config.remote_path.clone(),
            known_hosts: config.known_hosts.clone(),
            timeout,
        })
    }

    /// First address of the host that accepts a connection within the timeout.
    fn open_tcp(&self) -> Result<TcpStream, PublishError> {
        let mut last_err = None;
        for addr in (self.host.as_str(), self.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!("Connecting to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for {}", self.host),
                )
            })
            .into())
    }

    fn connect(&self) -> Result<Session, PublishError> {
        let tcp = self.open_tcp()?;
        let mut session = Session::new()?;
        // Milliseconds; zero would mean "wait forever"
        let timeout_ms = u32::try_from(self.timeout.as_millis())
            .unwrap_or(u32::MAX)
            .max(1);
        session.set_timeout(timeout_ms);
        session.set_tcp_stream(tcp);
        session.handshake()?;
        self.check_host_key(&session)?;
        session.userauth_password(&self.username, &self.password)?;
        info!("Connection to {} established", self.host);
        Ok(session)
    }

    fn check_host_key(&self, session: &Session) -> Result<(), PublishError> {
        let Some(path) = &self.known_hosts else {
            debug!("No known_hosts configured, skipping host key check");
            return Ok(());
        };

        let mut known = session.known_hosts()?;
        known.read_file(path, KnownHostFileKind::OpenSSH)?;
        let (key, _) = session
            .host_key()
            .ok_or_else(|| PublishError::HostKey(self.host.clone()))?;

        match known.check_port(&self.host, self.port, key) {
            CheckResult::Match => Ok(()),
            _ => Err(PublishError::HostKey(self.host.clone())),
        }
    }
}

impl Publisher for SftpPublisher {
    fn publish(&self, local: &Path) -> Result<PublishOutcome, PublishError> {
        let contents = fs::read(local)?;
        let session = self.connect()?;
        let sftp = session.sftp()?;

        let mut remote = sftp.create(&self.remote_path)?;
        remote.write_all(&contents)?;
        drop(remote);
        info!(
            "Uploaded {} ({} bytes) to {}",
            local.display(),
            contents.len(),
            self.remote_path.display()
        );

        let outcome = match sftp.stat(&self.remote_path) {
            Ok(_) => PublishOutcome::Verified,
            Err(_) => PublishOutcome::Missing,
        };
        Ok(outcome)
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.remote_path.display())
    }
}
