// src/batch.rs

//! Run several commands with a bounded number in flight.
//!
//! Results always come back in submission order. The batch-level error is
//! the first per-command error to be observed; a failing command never
//! stops siblings that were already admitted.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::errors::ProcessError;
use crate::exec::shell::{shell_argv, shell_options};
use crate::exec::{Argv, ExecutionOptions, ExecutionResult, Invoker, ShellOutput};
use crate::types::Platform;

/// Per-command outcome that can carry an error.
pub trait Outcome: Send + 'static {
    fn error(&self) -> Option<&ProcessError>;

    /// Outcome standing in for a command whose worker died.
    fn from_error(err: ProcessError) -> Self;
}

impl Outcome for ExecutionResult {
    fn error(&self) -> Option<&ProcessError> {
        self.error.as_ref()
    }

    fn from_error(err: ProcessError) -> Self {
        ExecutionResult {
            error: Some(err),
            ..ExecutionResult::default()
        }
    }
}

impl Outcome for ShellOutput {
    fn error(&self) -> Option<&ProcessError> {
        self.error.as_ref()
    }

    fn from_error(err: ProcessError) -> Self {
        ShellOutput {
            error: Some(err),
            ..ShellOutput::default()
        }
    }
}

/// Aggregate of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<T = ExecutionResult> {
    /// First per-command error observed, if any.
    pub error: Option<ProcessError>,
    /// One entry per command, in submission order.
    pub results: Vec<T>,
}

impl<T> BatchOutcome<T> {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

fn lost_worker(argv: &Argv, detail: impl std::fmt::Display) -> ProcessError {
    ProcessError::SpawnFailure {
        program: argv.program().unwrap_or_default().to_string(),
        message: format!("batch worker did not complete: {detail}"),
    }
}

impl Invoker {
    /// Run `commands` with at most `options.concurrency` in flight.
    pub async fn run_multiple<I, C>(&self, commands: I, options: ExecutionOptions) -> BatchOutcome
    where
        I: IntoIterator<Item = C>,
        C: Into<Argv>,
    {
        let argvs: Vec<Argv> = commands.into_iter().map(Into::into).collect();
        let limit = options.concurrency;
        let this = self.clone();
        run_bounded(argvs, limit, move |argv| {
            let this = this.clone();
            let options = options.clone();
            async move { this.invoke(argv, options).await }
        })
        .await
    }

    /// Shell command-line variant of [`run_multiple`](Self::run_multiple).
    pub async fn exec_command_lines<I, S>(&self, lines: I, options: ExecutionOptions) -> BatchOutcome<ShellOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let argvs: Vec<Argv> = lines
            .into_iter()
            .map(|line| shell_argv(line.as_ref(), Platform::current()))
            .collect();
        let limit = options.concurrency;
        let options = shell_options(options);
        let this = self.clone();
        run_bounded(argvs, limit, move |argv| {
            let this = this.clone();
            let options = options.clone();
            async move { ShellOutput::from(this.invoke(argv, options).await) }
        })
        .await
    }

    /// Blocking variant of [`run_multiple`](Self::run_multiple); workers are
    /// scoped threads.
    pub fn run_multiple_sync<I, C>(&self, commands: I, options: ExecutionOptions) -> BatchOutcome
    where
        I: IntoIterator<Item = C>,
        C: Into<Argv>,
    {
        let argvs: Vec<Argv> = commands.into_iter().map(Into::into).collect();
        let limit = options.concurrency;
        run_bounded_blocking(argvs, limit, |argv| self.spawn_sync(argv, options.clone()))
    }

    /// Blocking shell command-line batch.
    pub fn exec_command_lines_sync<I, S>(&self, lines: I, options: ExecutionOptions) -> BatchOutcome<ShellOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let argvs: Vec<Argv> = lines
            .into_iter()
            .map(|line| shell_argv(line.as_ref(), Platform::current()))
            .collect();
        let limit = options.concurrency;
        let options = shell_options(options);
        run_bounded_blocking(argvs, limit, |argv| {
            ShellOutput::from(self.spawn_sync(argv, options.clone()))
        })
    }
}

async fn run_bounded<T, F, Fut>(argvs: Vec<Argv>, concurrency: usize, run: F) -> BatchOutcome<T>
where
    T: Outcome,
    F: Fn(Argv) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let limit = concurrency.max(1);
    debug!(commands = argvs.len(), limit, "starting batch");

    let semaphore = Arc::new(Semaphore::new(limit));
    let first_error: Arc<OnceLock<ProcessError>> = Arc::new(OnceLock::new());
    let mut handles = Vec::with_capacity(argvs.len());

    for argv in argvs {
        // No further command is admitted until an in-flight one finishes.
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("batch semaphore is never closed"),
        };
        let fut = run(argv.clone());
        let first_error = Arc::clone(&first_error);
        let handle = tokio::spawn(async move {
            let outcome = fut.await;
            if let Some(err) = outcome.error() {
                let _ = first_error.set(err.clone());
            }
            drop(permit);
            outcome
        });
        handles.push((argv, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (argv, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(command = %argv, error = %e, "batch task failed");
                let err = lost_worker(&argv, e);
                let _ = first_error.set(err.clone());
                T::from_error(err)
            }
        };
        results.push(outcome);
    }

    BatchOutcome {
        error: first_error.get().cloned(),
        results,
    }
}

fn run_bounded_blocking<T, F>(argvs: Vec<Argv>, concurrency: usize, run: F) -> BatchOutcome<T>
where
    T: Outcome,
    F: Fn(Argv) -> T + Sync,
{
    let limit = concurrency.max(1).min(argvs.len().max(1));
    debug!(commands = argvs.len(), limit, "starting blocking batch");

    let next = AtomicUsize::new(0);
    let first_error = OnceLock::new();
    let slots: Vec<Mutex<Option<T>>> = argvs.iter().map(|_| Mutex::new(None)).collect();

    std::thread::scope(|s| {
        for _ in 0..limit {
            s.spawn(|| {
                loop {
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    let Some(argv) = argvs.get(i) else { break };
                    let outcome = run(argv.clone());
                    if let Some(err) = outcome.error() {
                        let _ = first_error.set(err.clone());
                    }
                    let mut slot = match slots[i].lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    *slot = Some(outcome);
                }
            });
        }
    });

    let results = slots
        .into_iter()
        .zip(&argvs)
        .map(|(slot, argv)| {
            let filled = match slot.into_inner() {
                Ok(inner) => inner,
                Err(poisoned) => poisoned.into_inner(),
            };
            filled.unwrap_or_else(|| {
                let err = lost_worker(argv, "worker thread panicked");
                let _ = first_error.set(err.clone());
                T::from_error(err)
            })
        })
        .collect();

    BatchOutcome {
        error: first_error.get().cloned(),
        results,
    }
}
