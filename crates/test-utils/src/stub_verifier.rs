use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use procguard::resolve::ExecutableVerifier;
use procguard::resolve::verify::VerifyFuture;
use tracing::trace;

/// A fake verifier that:
/// - treats exactly the registered paths as executable
/// - records every path it was asked about, in order.
#[derive(Debug, Default)]
pub struct StubVerifier {
    executable: HashSet<PathBuf>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl StubVerifier {
    pub fn new<I, P>(executable: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            executable: executable.into_iter().map(Into::into).collect(),
            calls: Arc::default(),
        }
    }

    /// Every path checked so far.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn check(&self, path: &Path) -> bool {
        self.calls.lock().unwrap().push(path.to_path_buf());
        let executable = self.executable.contains(path);
        trace!(path = %path.display(), executable, "stub verifier consulted");
        executable
    }
}

impl ExecutableVerifier for StubVerifier {
    fn is_executable_blocking(&self, path: &Path) -> bool {
        self.check(path)
    }

    fn is_executable<'a>(&'a self, path: &'a Path) -> VerifyFuture<'a> {
        Box::pin(async move { self.check(path) })
    }
}
