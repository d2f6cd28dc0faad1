// src/resolve/verify.rs

//! Decide whether a candidate path can be executed by the current user.
//!
//! Two strategies:
//! - a direct permission check (`access(X_OK)` on a regular file), used on
//!   Unix;
//! - a launch probe: run the candidate with `--version` and only reject it
//!   when it could not be launched at all (not found, access denied). A
//!   binary that starts and then rejects the flag still counts.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::types::VerifyStrategy;

/// Flag passed to candidates by the launch probe.
pub const PROBE_FLAG: &str = "--version";

static PERMISSION_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)permission denied|access is denied|\bEACCES\b|\bEPERM\b")
        .expect("permission message pattern is valid")
});

pub type VerifyFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// Checks candidate paths for the resolver.
///
/// Production code uses [`SystemVerifier`]; tests can plug in a recording
/// fake that never touches the filesystem.
pub trait ExecutableVerifier: Send + Sync + fmt::Debug {
    fn is_executable_blocking(&self, path: &Path) -> bool;

    fn is_executable<'a>(&'a self, path: &'a Path) -> VerifyFuture<'a>;
}

/// Classification of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Executable,
    Missing,
    PermissionDenied,
}

impl Verdict {
    pub fn is_executable(self) -> bool {
        matches!(self, Verdict::Executable)
    }
}

/// Verifier backed by the real OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVerifier {
    strategy: VerifyStrategy,
}

impl SystemVerifier {
    pub fn new(strategy: VerifyStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> VerifyStrategy {
        self.strategy
    }

    pub fn verdict_blocking(&self, path: &Path) -> Verdict {
        let verdict = match self.direct(path) {
            Some(verdict) => verdict,
            None => probe_blocking(path),
        };
        trace!(path = %path.display(), ?verdict, "verified candidate");
        verdict
    }

    pub async fn verdict(&self, path: &Path) -> Verdict {
        let verdict = match self.direct_async(path).await {
            Some(verdict) => verdict,
            None => probe(path).await,
        };
        trace!(path = %path.display(), ?verdict, "verified candidate");
        verdict
    }

    fn direct(&self, path: &Path) -> Option<Verdict> {
        match self.strategy {
            VerifyStrategy::Auto => direct_check(path),
            VerifyStrategy::Probe => None,
        }
    }

    /// [`Self::direct`] on the blocking pool; stat and `access` are syscalls.
    async fn direct_async(&self, path: &Path) -> Option<Verdict> {
        match self.strategy {
            VerifyStrategy::Auto => {
                let owned = path.to_path_buf();
                // A failed join falls back to the launch check.
                tokio::task::spawn_blocking(move || direct_check(&owned))
                    .await
                    .unwrap_or(None)
            }
            VerifyStrategy::Probe => None,
        }
    }
}

impl ExecutableVerifier for SystemVerifier {
    fn is_executable_blocking(&self, path: &Path) -> bool {
        self.verdict_blocking(path).is_executable()
    }

    fn is_executable<'a>(&'a self, path: &'a Path) -> VerifyFuture<'a> {
        Box::pin(async move { self.verdict(path).await.is_executable() })
    }
}

/// OS permission check; `None` where the platform has no such primitive.
#[cfg(unix)]
pub fn direct_check(path: &Path) -> Option<Verdict> {
    use nix::errno::Errno;
    use nix::unistd::{AccessFlags, access};

    let is_file = std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Some(Verdict::Missing);
    }

    Some(match access(path, AccessFlags::X_OK) {
        Ok(()) => Verdict::Executable,
        Err(Errno::EACCES) | Err(Errno::EPERM) => Verdict::PermissionDenied,
        Err(_) => Verdict::Missing,
    })
}

#[cfg(not(unix))]
pub fn direct_check(_path: &Path) -> Option<Verdict> {
    None
}

/// Classify a failed launch attempt.
pub fn classify_launch_error(err: &io::Error) -> Verdict {
    match err.kind() {
        io::ErrorKind::NotFound => Verdict::Missing,
        io::ErrorKind::PermissionDenied => Verdict::PermissionDenied,
        _ if PERMISSION_MESSAGE.is_match(&err.to_string()) => Verdict::PermissionDenied,
        // Launched far enough to fail for another reason (bad format,
        // unsupported flag, ...): the file itself is runnable.
        _ => Verdict::Executable,
    }
}

fn probe_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(path);
    cmd.arg(PROBE_FLAG)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

pub fn probe_blocking(path: &Path) -> Verdict {
    match probe_command(path).spawn() {
        Ok(mut child) => {
            // It launched; that is all the probe needs to know.
            let _ = child.kill();
            let _ = child.wait();
            Verdict::Executable
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "launch probe failed");
            classify_launch_error(&err)
        }
    }
}

pub async fn probe(path: &Path) -> Verdict {
    let mut cmd = tokio::process::Command::from(probe_command(path));
    cmd.kill_on_drop(true);
    match cmd.spawn() {
        Ok(mut child) => {
            let _ = child.kill().await;
            Verdict::Executable
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "launch probe failed");
            classify_launch_error(&err)
        }
    }
}
