// src/exec/shell.rs

//! Shell-interpreted command lines.

use crate::exec::Invoker;
use crate::exec::options::{Argv, ExecutionOptions};
use crate::exec::result::ShellOutput;
use crate::types::Platform;

/// Argv that runs `line` through the platform shell.
pub fn shell_argv(line: &str, platform: Platform) -> Argv {
    match platform {
        Platform::Windows => Argv::from(vec!["cmd".to_string(), "/C".to_string(), line.to_string()]),
        Platform::Unix => Argv::from(vec!["sh".to_string(), "-c".to_string(), line.to_string()]),
    }
}

/// Command-line runs capture output unless the caller wired stdio.
pub(crate) fn shell_options(mut options: ExecutionOptions) -> ExecutionOptions {
    if options.stdio.is_none() {
        options.read = true;
    }
    options
}

impl Invoker {
    /// Run `line` through `sh -c` (or `cmd /C` on Windows).
    pub async fn exec_command_line(&self, line: &str, options: ExecutionOptions) -> ShellOutput {
        let argv = shell_argv(line, Platform::current());
        self.invoke(argv, shell_options(options)).await.into()
    }

    /// Blocking variant of [`exec_command_line`](Self::exec_command_line).
    pub fn exec_command_line_sync(&self, line: &str, options: ExecutionOptions) -> ShellOutput {
        let argv = shell_argv(line, Platform::current());
        self.spawn_sync(argv, shell_options(options)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_argv_keeps_the_line_as_one_token() {
        let argv = shell_argv("echo a && echo b", Platform::Unix);
        assert_eq!(argv.tokens(), ["sh", "-c", "echo a && echo b"]);

        let argv = shell_argv("dir /b", Platform::Windows);
        assert_eq!(argv.tokens(), ["cmd", "/C", "dir /b"]);
    }

    #[test]
    fn command_lines_capture_by_default() {
        assert!(shell_options(ExecutionOptions::default()).read);
    }
}
