// src/exec/mod.rs

//! Process invocation layer.
//!
//! Every invocation follows the same pipeline: normalize the request
//! ([`options`]) → take a gate slot → resolve argv[0] (unless `safe` is
//! off) → spawn → capture/mirror output ([`output`]) → finalize the result
//! ([`result`]) → release the slot → hand the result back.
//!
//! - [`spawn`] is the async pipeline on `tokio::process`.
//! - [`blocking`] is the same pipeline on `std::process` and threads.
//! - [`shell`] runs command lines through the platform shell.

pub mod blocking;
pub mod options;
pub mod output;
pub mod result;
pub mod shell;
pub mod spawn;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::context::SpawnContext;
use crate::errors::ProcessError;

pub use options::{Argv, EnvPolicy, ExecutionOptions, LaunchPlan, OutputMode, StdioMode, StdioWiring};
pub use output::{Stream, format_mirrored_chunk};
pub use result::{ExecutionResult, ShellOutput};
pub use shell::shell_argv;

/// Entry point for running child processes against a [`SpawnContext`].
///
/// Cheap to clone; clones share the context (cache + gate).
#[derive(Debug, Clone)]
pub struct Invoker {
    ctx: Arc<SpawnContext>,
}

impl Invoker {
    pub fn new(ctx: Arc<SpawnContext>) -> Self {
        Self { ctx }
    }

    /// Invoker bound to the process-wide default context.
    pub fn global() -> Self {
        Self::new(SpawnContext::global())
    }

    pub fn context(&self) -> &Arc<SpawnContext> {
        &self.ctx
    }

    /// Run one command, honouring `options.sync`.
    ///
    /// With `sync` set the blocking pipeline runs on Tokio's blocking pool so
    /// the calling task is not stalled.
    pub async fn invoke(&self, argv: impl Into<Argv>, options: ExecutionOptions) -> ExecutionResult {
        let argv = argv.into();
        if !options.sync {
            return self.spawn(argv, options).await;
        }

        let this = self.clone();
        let program = argv.program().unwrap_or_default().to_string();
        match tokio::task::spawn_blocking(move || this.spawn_sync(argv, options)).await {
            Ok(result) => result,
            Err(e) => ExecutionResult {
                error: Some(ProcessError::SpawnFailure {
                    program,
                    message: format!("blocking invocation did not complete: {e}"),
                }),
                ..ExecutionResult::default()
            },
        }
    }

    /// Callback form of [`spawn`](Self::spawn): runs on a Tokio task and
    /// calls `on_complete` exactly once with the finalized result.
    pub fn spawn_with<F>(&self, argv: impl Into<Argv>, options: ExecutionOptions, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(ExecutionResult) + Send + 'static,
    {
        let this = self.clone();
        let argv = argv.into();
        tokio::spawn(async move {
            let result = this.spawn(argv, options).await;
            on_complete(result);
        })
    }
}
