// src/exec/spawn.rs

//! Async invocation pipeline.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::ProcessError;
use crate::exec::Invoker;
use crate::exec::options::{Argv, ExecutionOptions, LaunchPlan};
use crate::exec::output::{Drain, Stream};
use crate::exec::result::{ExecutionResult, ResultBuilder};

impl Invoker {
    /// Run one command to completion without blocking the runtime.
    ///
    /// Waits for a gate slot first; the slot is held until the child has
    /// exited and both output streams are closed, and is released before the
    /// result is returned. Failures come back inside the result, never as a
    /// panic or an `Err`.
    pub async fn spawn(&self, argv: impl Into<Argv>, options: ExecutionOptions) -> ExecutionResult {
        let argv = argv.into();
        let builder = ResultBuilder::new(
            argv.to_string(),
            options.output_prefix.clone(),
            self.ctx.settings().output_tail_lines,
        );
        let plan = match LaunchPlan::new(argv, options) {
            Ok(plan) => plan,
            Err(err) => return builder.fail(err),
        };

        let slot = self.ctx.gate().acquire().await;
        let result = self.launch(plan, builder).await;
        slot.release();
        result
    }

    async fn program_path(&self, plan: &LaunchPlan) -> Result<PathBuf, ProcessError> {
        if plan.safe {
            self.ctx.resolver().resolve(plan.program(), plan.cache).await
        } else {
            Ok(PathBuf::from(plan.program()))
        }
    }

    async fn launch(&self, plan: LaunchPlan, mut builder: ResultBuilder) -> ExecutionResult {
        let program = match self.program_path(&plan).await {
            Ok(path) => path,
            Err(err) => {
                debug!(command = %plan.argv, error = %err, "resolution failed; not spawning");
                return builder.fail(err);
            }
        };

        let mut cmd = tokio::process::Command::from(plan.command(program.as_os_str()));
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(command = %plan.argv, program = %program.display(), error = %err, "spawn failed");
                return builder.fail(ProcessError::from_spawn(&program.to_string_lossy(), &err));
            }
        };
        builder.pid(child.id());
        info!(command = %plan.argv, pid = ?child.id(), "process started");

        let stdin_task = match (child.stdin.take(), plan.stdin.clone()) {
            (Some(mut pipe), Some(bytes)) => Some(tokio::spawn(async move {
                if let Err(e) = pipe.write_all(&bytes).await {
                    if e.kind() != ErrorKind::BrokenPipe {
                        warn!(error = %e, "failed to write child stdin");
                    }
                }
                // Dropping the pipe closes the child's stdin.
            })),
            _ => None,
        };

        let drain = |stream| Drain {
            stream,
            capture: plan.captures(),
            mirror: plan.mirrors(),
            prefix: plan.prefix.clone(),
        };
        let stdout_task = child.stdout.take().map(|out| tokio::spawn(drain(Stream::Stdout).run(out)));
        let stderr_task = child.stderr.take().map(|err| tokio::spawn(drain(Stream::Stderr).run(err)));

        match child.wait().await {
            Ok(status) => builder.exit(status),
            Err(err) => builder.error(ProcessError::SpawnFailure {
                program: program.to_string_lossy().into_owned(),
                message: format!("waiting for process failed: {err}"),
            }),
        }

        if let Some(task) = stdin_task {
            let _ = task.await;
        }
        let stdout = join_output(stdout_task).await;
        let stderr = join_output(stderr_task).await;
        if plan.captures() {
            builder.captured(Some(stdout), Some(stderr));
        }

        let result = builder.finish();
        info!(
            command = %plan.argv,
            status = ?result.status,
            signal = ?result.signal,
            success = result.error.is_none(),
            "process exited"
        );
        result
    }
}

async fn join_output(task: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    let Some(task) = task else {
        return Vec::new();
    };
    match task.await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "output reader task failed");
            Vec::new()
        }
    }
}
