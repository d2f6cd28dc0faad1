// src/lib.rs

//! Safe child-process execution.
//!
//! - [`resolve`] turns a bare program name into a verified absolute path,
//!   with a cache and special handling for git, node and npm.
//! - [`gate`] bounds how many children are active at once.
//! - [`exec`] spawns one command and normalizes its outcome.
//! - [`batch`] runs many commands with a concurrency bound.
//!
//! The free functions below use the process-wide [`SpawnContext`]; build
//! your own context when you need isolated caches or a different limit.

pub mod batch;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod exec;
pub mod gate;
pub mod logging;
pub mod resolve;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

pub use crate::batch::{BatchOutcome, Outcome};
pub use crate::context::SpawnContext;
pub use crate::errors::ProcessError;
pub use crate::exec::{Argv, EnvPolicy, ExecutionOptions, ExecutionResult, Invoker, ShellOutput, StdioWiring};

use crate::cli::{CliArgs, Command, RunArgs};
use crate::config::Settings;
use crate::resolve::SystemVerifier;
use crate::types::VerifyStrategy;

/// Run one command on the default context.
pub async fn spawn(argv: impl Into<Argv>, options: ExecutionOptions) -> ExecutionResult {
    Invoker::global().invoke(argv, options).await
}

/// Blocking form of [`spawn`].
pub fn spawn_sync(argv: impl Into<Argv>, options: ExecutionOptions) -> ExecutionResult {
    Invoker::global().spawn_sync(argv, options)
}

/// Run a command line through the platform shell on the default context.
pub async fn exec_command_line(line: &str, options: ExecutionOptions) -> ShellOutput {
    Invoker::global().exec_command_line(line, options).await
}

/// Blocking form of [`exec_command_line`].
pub fn exec_command_line_sync(line: &str, options: ExecutionOptions) -> ShellOutput {
    Invoker::global().exec_command_line_sync(line, options)
}

/// Run many commands, at most `options.concurrency` at a time.
pub async fn run_multiple<I, C>(commands: I, options: ExecutionOptions) -> BatchOutcome
where
    I: IntoIterator<Item = C>,
    C: Into<Argv>,
{
    Invoker::global().run_multiple(commands, options).await
}

/// Blocking form of [`run_multiple`].
pub fn run_multiple_sync<I, C>(commands: I, options: ExecutionOptions) -> BatchOutcome
where
    I: IntoIterator<Item = C>,
    C: Into<Argv>,
{
    Invoker::global().run_multiple_sync(commands, options)
}

/// Run many shell command lines, at most `options.concurrency` at a time.
pub async fn exec_command_lines<I, S>(lines: I, options: ExecutionOptions) -> BatchOutcome<ShellOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Invoker::global().exec_command_lines(lines, options).await
}

/// Blocking form of [`exec_command_lines`].
pub fn exec_command_lines_sync<I, S>(lines: I, options: ExecutionOptions) -> BatchOutcome<ShellOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Invoker::global().exec_command_lines_sync(lines, options)
}

/// Resolve `name` to an absolute, verified executable path.
pub async fn resolve_executable_path(name: &str) -> Result<PathBuf, ProcessError> {
    SpawnContext::global().resolve_executable_path(name).await
}

/// Whether `path` is a file the current user may execute.
pub async fn is_executable(path: &Path) -> bool {
    SpawnContext::global().is_executable(path).await
}

/// Blocking form of [`is_executable`].
pub fn is_executable_blocking(path: &Path) -> bool {
    SpawnContext::global().is_executable_blocking(path)
}

/// Home directory (`HOME`, or `USERPROFILE` on Windows), cached.
pub fn home_path() -> Result<PathBuf, ProcessError> {
    SpawnContext::global().home_path()
}

/// Temp directory, cached. Never fails on a platform with a default.
pub fn temp_path() -> Result<PathBuf, ProcessError> {
    SpawnContext::global().temp_path()
}

/// High-level entry point used by `main.rs`. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let settings = match &args.config {
        Some(path) => config::load_and_validate(path)?,
        None => Settings::from_env(),
    };
    debug!(?settings, "effective settings");

    let ctx = Arc::new(SpawnContext::new(settings));
    let invoker = Invoker::new(Arc::clone(&ctx));

    match args.command {
        Command::Run(run) => Ok(run_one(&invoker, run).await),
        Command::Sh { prefix, line } => {
            let options = ExecutionOptions {
                output: true,
                output_prefix: prefix,
                ..ExecutionOptions::default()
            };
            let out = invoker.exec_command_line(&line.join(" "), options).await;
            Ok(report(out.status, out.signal.as_deref(), out.error.as_ref()))
        }
        Command::Batch { concurrency, commands } => {
            let options = ExecutionOptions {
                output: true,
                concurrency,
                ..ExecutionOptions::default()
            };
            let outcome = invoker
                .run_multiple(commands.iter().map(|c| Argv::parse(c)), options)
                .await;
            for (command, result) in commands.iter().zip(&outcome.results) {
                if let Some(err) = &result.error {
                    eprintln!("{command}: {err}");
                }
            }
            Ok(match &outcome.error {
                None => 0,
                Some(err) => err.exit_status().unwrap_or(1),
            })
        }
        Command::Which { no_cache, names } => {
            let resolver = ctx.resolver();
            let mut code = 0;
            for name in &names {
                match resolver.resolve(name, !no_cache).await {
                    Ok(path) => println!("{}", path.display()),
                    Err(err) => {
                        eprintln!("{err}");
                        code = 1;
                    }
                }
            }
            Ok(code)
        }
        Command::Check { probe, path } => {
            let strategy = if probe {
                VerifyStrategy::Probe
            } else {
                ctx.settings().verify_strategy
            };
            let verdict = SystemVerifier::new(strategy).verdict(&path).await;
            println!("{}: {verdict:?}", path.display());
            Ok(if verdict.is_executable() { 0 } else { 1 })
        }
        Command::Paths => {
            println!("home: {}", ctx.home_path()?.display());
            println!("temp: {}", ctx.temp_path()?.display());
            Ok(0)
        }
    }
}

async fn run_one(invoker: &Invoker, run: RunArgs) -> i32 {
    let options = ExecutionOptions {
        cwd: run.cwd,
        stdin: run.stdin.map(String::into_bytes),
        stdio: run.quiet.then(StdioWiring::null),
        safe: !run.no_safe,
        cache: !run.no_cache,
        output: run.prefix.is_some(),
        output_prefix: run.prefix,
        ..ExecutionOptions::default()
    };
    let result = invoker.invoke(run.argv, options).await;
    report(result.status, result.signal.as_deref(), result.error.as_ref())
}

fn report(status: Option<i32>, signal: Option<&str>, error: Option<&ProcessError>) -> i32 {
    if let Some(signal) = signal {
        eprintln!("terminated by {signal}");
    }
    if let Some(err) = error {
        // Non-zero exits were already visible through the child's own output.
        if !matches!(err, ProcessError::NonZeroExit { .. }) {
            eprintln!("{err}");
        }
    }
    match (status, signal, error) {
        (Some(code), _, _) => code,
        (None, None, None) => 0,
        _ => 1,
    }
}
