// src/exec/options.rs

//! Invocation request types and their one-time normalization.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use crate::errors::ProcessError;

/// Ordered argv tokens; the first token names the program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argv(Vec<String>);

impl Argv {
    /// Split a plain command string on whitespace.
    pub fn parse(line: &str) -> Self {
        Self(line.split_whitespace().map(str::to_string).collect())
    }

    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Argv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl From<&str> for Argv {
    fn from(line: &str) -> Self {
        Argv::parse(line)
    }
}

impl From<String> for Argv {
    fn from(line: String) -> Self {
        Argv::parse(&line)
    }
}

impl From<Vec<String>> for Argv {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<Vec<&str>> for Argv {
    fn from(tokens: Vec<&str>) -> Self {
        Self(tokens.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Argv {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Argv {
    fn from(tokens: [&str; N]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// Environment handed to the child.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvPolicy {
    /// Inherit the caller's environment (default).
    #[default]
    Inherit,
    /// Start the child with no environment at all.
    Empty,
    /// Exactly these variables and nothing else.
    Exact(BTreeMap<String, String>),
}

/// Wiring of one child stream when the caller takes over stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    Inherit,
    Null,
}

impl StdioMode {
    fn to_stdio(self) -> Stdio {
        match self {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Null => Stdio::null(),
        }
    }
}

/// Explicit stdio wiring. Setting it disables capture and mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioWiring {
    pub stdin: StdioMode,
    pub stdout: StdioMode,
    pub stderr: StdioMode,
}

impl StdioWiring {
    pub fn inherit() -> Self {
        Self {
            stdin: StdioMode::Inherit,
            stdout: StdioMode::Inherit,
            stderr: StdioMode::Inherit,
        }
    }

    pub fn null() -> Self {
        Self {
            stdin: StdioMode::Null,
            stdout: StdioMode::Null,
            stderr: StdioMode::Null,
        }
    }
}

/// Per-invocation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Working directory; the caller's when unset.
    pub cwd: Option<PathBuf>,
    pub env: EnvPolicy,
    /// Bytes written to the child's stdin, which is then closed.
    pub stdin: Option<Vec<u8>>,
    /// Explicit stream wiring; disables `read` and `output`.
    pub stdio: Option<StdioWiring>,
    /// Resolve argv[0] through the path resolver before spawning.
    pub safe: bool,
    /// Capture stdout/stderr into the result.
    pub read: bool,
    /// Mirror output to the parent's stdout/stderr as it arrives.
    pub output: bool,
    /// Prepended to every mirrored line and to error messages.
    pub output_prefix: Option<String>,
    /// Let path resolution read and write the path cache.
    pub cache: bool,
    /// Use the blocking invocation path.
    pub sync: bool,
    /// Batch only: commands in flight at once.
    pub concurrency: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            env: EnvPolicy::Inherit,
            stdin: None,
            stdio: None,
            safe: true,
            read: false,
            output: false,
            output_prefix: None,
            cache: true,
            sync: false,
            concurrency: 1,
        }
    }
}

impl ExecutionOptions {
    /// Options that capture output (the shape most callers want).
    pub fn captured() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }
}

/// How the child's output streams are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Explicit wiring from the caller.
    Wired(StdioWiring),
    /// Pipe both streams; `capture` and/or `mirror` them.
    Piped { capture: bool, mirror: bool },
    /// Neither capture nor wiring requested: share the parent's streams.
    Inherit,
}

/// A validated, normalized request ready to be launched.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub argv: Argv,
    pub cwd: Option<PathBuf>,
    pub env: EnvPolicy,
    pub stdin: Option<Vec<u8>>,
    pub output: OutputMode,
    pub prefix: Option<String>,
    pub safe: bool,
    pub cache: bool,
}

impl LaunchPlan {
    /// Validate and normalize once; nothing downstream re-reads the raw
    /// options.
    pub fn new(argv: Argv, options: ExecutionOptions) -> Result<Self, ProcessError> {
        if argv.program().is_none_or(|p| p.trim().is_empty()) {
            return Err(ProcessError::InvalidCommand {
                message: "command has no program".to_string(),
            });
        }

        let output = match options.stdio {
            Some(wiring) => OutputMode::Wired(wiring),
            None if options.read || options.output => OutputMode::Piped {
                capture: options.read,
                mirror: options.output,
            },
            None => OutputMode::Inherit,
        };

        Ok(Self {
            argv,
            cwd: options.cwd,
            env: options.env,
            stdin: options.stdin,
            output,
            prefix: options.output_prefix.filter(|p| !p.is_empty()),
            safe: options.safe,
            cache: options.cache,
        })
    }

    pub fn program(&self) -> &str {
        self.argv.program().unwrap_or_default()
    }

    pub fn captures(&self) -> bool {
        matches!(self.output, OutputMode::Piped { capture: true, .. })
    }

    pub fn mirrors(&self) -> bool {
        matches!(self.output, OutputMode::Piped { mirror: true, .. })
    }

    /// Build the OS command for `program` (argv[0] after resolution).
    pub fn command(&self, program: &std::ffi::OsStr) -> std::process::Command {
        let mut cmd = std::process::Command::new(program);
        cmd.args(self.argv.args());

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        match &self.env {
            EnvPolicy::Inherit => {}
            EnvPolicy::Empty => {
                cmd.env_clear();
            }
            EnvPolicy::Exact(vars) => {
                cmd.env_clear().envs(vars);
            }
        }

        let stdin = match (&self.stdin, self.output) {
            (Some(_), _) => Stdio::piped(),
            (None, OutputMode::Wired(wiring)) => wiring.stdin.to_stdio(),
            (None, _) => Stdio::null(),
        };
        cmd.stdin(stdin);

        match self.output {
            OutputMode::Wired(wiring) => {
                cmd.stdout(wiring.stdout.to_stdio()).stderr(wiring.stderr.to_stdio());
            }
            OutputMode::Piped { .. } => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        cmd
    }
}
