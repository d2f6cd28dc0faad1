// src/exec/result.rs

use std::borrow::Cow;
use std::process::ExitStatus;

use crate::errors::ProcessError;

/// Normalized outcome of one invocation.
///
/// Invariant: a non-zero `status` always comes with an `error`; an error
/// that existed before the process finished (resolution or spawn failure)
/// is never replaced by the exit-status error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    /// OS process id; `None` if nothing was spawned.
    pub pid: Option<u32>,
    /// Captured stdout; `None` when capture was off.
    pub stdout: Option<Vec<u8>>,
    pub stderr: Option<Vec<u8>>,
    /// Exit code; `None` on signal termination or when never run.
    pub status: Option<i32>,
    /// Terminating signal name (e.g. `SIGKILL`).
    pub signal: Option<String>,
    pub error: Option<ProcessError>,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.status == Some(0)
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        lossy(self.stdout.as_deref())
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        lossy(self.stderr.as_deref())
    }

    /// Turn the embedded error into a `Result`.
    pub fn into_result(self) -> Result<ExecutionResult, ProcessError> {
        match self.error.clone() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

fn lossy(bytes: Option<&[u8]>) -> Cow<'_, str> {
    match bytes {
        Some(b) => String::from_utf8_lossy(b),
        None => Cow::Borrowed(""),
    }
}

/// Result shape of the shell command-line operations (no pid).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellOutput {
    pub stdout: Option<Vec<u8>>,
    pub stderr: Option<Vec<u8>>,
    pub status: Option<i32>,
    pub signal: Option<String>,
    pub error: Option<ProcessError>,
}

impl ShellOutput {
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        lossy(self.stdout.as_deref())
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        lossy(self.stderr.as_deref())
    }
}

impl From<ExecutionResult> for ShellOutput {
    fn from(r: ExecutionResult) -> Self {
        Self {
            stdout: r.stdout,
            stderr: r.stderr,
            status: r.status,
            signal: r.signal,
            error: r.error,
        }
    }
}

/// Accumulates an [`ExecutionResult`] during one invocation.
///
/// `finish` consumes the builder, so a result is finalized exactly once.
#[derive(Debug)]
pub(crate) struct ResultBuilder {
    command: String,
    prefix: Option<String>,
    tail_lines: usize,
    result: ExecutionResult,
}

impl ResultBuilder {
    pub(crate) fn new(command: String, prefix: Option<String>, tail_lines: usize) -> Self {
        Self {
            command,
            prefix,
            tail_lines,
            result: ExecutionResult::default(),
        }
    }

    pub(crate) fn pid(&mut self, pid: Option<u32>) {
        self.result.pid = pid;
    }

    pub(crate) fn captured(&mut self, stdout: Option<Vec<u8>>, stderr: Option<Vec<u8>>) {
        self.result.stdout = stdout;
        self.result.stderr = stderr;
    }

    pub(crate) fn exit(&mut self, status: ExitStatus) {
        self.result.status = status.code();
        self.result.signal = signal_name(&status);
    }

    /// Record an error unless one is already present.
    pub(crate) fn error(&mut self, err: ProcessError) {
        if self.result.error.is_none() {
            self.result.error = Some(err);
        }
    }

    /// Shortcut for failures before anything was spawned.
    pub(crate) fn fail(mut self, err: ProcessError) -> ExecutionResult {
        self.error(err);
        self.finish()
    }

    pub(crate) fn finish(mut self) -> ExecutionResult {
        if self.result.error.is_none() {
            if let Some(status) = self.result.status.filter(|s| *s != 0) {
                let message = self.exit_message(status);
                self.result.error = Some(ProcessError::NonZeroExit { status, message });
            }
        }
        self.result
    }

    fn exit_message(&self, status: i32) -> String {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let mut message = format!("{prefix}Command `{}` exited with status {status}", self.command);
        for (label, bytes) in [("stdout", &self.result.stdout), ("stderr", &self.result.stderr)] {
            let Some(bytes) = bytes else { continue };
            if let Some(tail) = format_tail(bytes, self.tail_lines, prefix) {
                message.push_str(&format!("\n{prefix}{label}:\n{tail}"));
            }
        }
        message
    }
}

/// Trimmed last `max_lines` lines of `bytes`, each line prefixed.
/// `max_lines == 0` keeps everything. `None` if there is nothing to show.
pub fn format_tail(bytes: &[u8], max_lines: usize, prefix: &str) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    let start = if max_lines == 0 {
        0
    } else {
        lines.len().saturating_sub(max_lines)
    };
    Some(
        lines[start..]
            .iter()
            .map(|line| format!("{prefix}{line}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

#[cfg(unix)]
fn signal_name(status: &ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;

    let signo = status.signal()?;
    Some(match nix::sys::signal::Signal::try_from(signo) {
        Ok(sig) => sig.as_str().to_string(),
        Err(_) => format!("SIG{signo}"),
    })
}

#[cfg(not(unix))]
fn signal_name(_status: &ExitStatus) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ResultBuilder {
        ResultBuilder::new("make all".to_string(), None, 2)
    }

    #[test]
    fn tail_keeps_last_lines_with_prefix() {
        let got = format_tail(b"\n a\nb\nc \n\n", 2, "> ").unwrap();
        assert_eq!(got, "> b\n> c");
        assert_eq!(format_tail(b"a\nb\nc", 0, "").unwrap(), "a\nb\nc");
        assert_eq!(format_tail(b"  \n", 5, ""), None);
    }

    #[test]
    fn non_zero_status_synthesizes_error_with_output_blocks() {
        let mut b = builder();
        b.result.status = Some(2);
        b.captured(Some(b"compiling\nok".to_vec()), Some(b"boom\n".to_vec()));
        let r = b.finish();
        let err = r.error.expect("error for non-zero exit");
        assert_eq!(err.exit_status(), Some(2));
        let msg = err.to_string();
        assert!(msg.starts_with("Command `make all` exited with status 2"));
        assert!(msg.contains("\nstdout:\ncompiling\nok"));
        assert!(msg.contains("\nstderr:\nboom"));
    }

    #[test]
    fn zero_status_has_no_error() {
        let mut b = builder();
        b.result.status = Some(0);
        assert!(b.finish().succeeded());
    }

    #[test]
    fn earlier_error_wins_over_exit_status() {
        let mut b = builder();
        b.error(ProcessError::SpawnFailure {
            program: "make".to_string(),
            message: "gone".to_string(),
        });
        b.result.status = Some(1);
        let r = b.finish();
        assert!(matches!(r.error, Some(ProcessError::SpawnFailure { .. })));
    }

    #[test]
    fn prefix_decorates_error_message() {
        let mut b = ResultBuilder::new("x".to_string(), Some("[x] ".to_string()), 10);
        b.result.status = Some(1);
        b.captured(None, Some(b"bad".to_vec()));
        let msg = b.finish().error.unwrap().to_string();
        assert_eq!(msg, "[x] Command `x` exited with status 1\n[x] stderr:\n[x] bad");
    }

    #[test]
    fn shell_output_drops_pid() {
        let r = ExecutionResult {
            pid: Some(42),
            status: Some(0),
            stdout: Some(b"hi".to_vec()),
            ..ExecutionResult::default()
        };
        let s = ShellOutput::from(r);
        assert_eq!(s.stdout_lossy(), "hi");
        assert_eq!(s.status, Some(0));
    }
}
