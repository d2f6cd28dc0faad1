// src/exec/blocking.rs

//! Blocking invocation pipeline.
//!
//! Same contract as the async pipeline, with two differences:
//! - the gate slot is best-effort: taken if one is free right now,
//!   otherwise the invocation proceeds without one (and says so);
//! - argv[0] is resolved with blocking verification, which always runs to
//!   completion before the child is spawned.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::thread::ScopedJoinHandle;

use tracing::{debug, info, warn};

use crate::errors::ProcessError;
use crate::exec::Invoker;
use crate::exec::options::{Argv, ExecutionOptions, LaunchPlan};
use crate::exec::output::{Drain, Stream};
use crate::exec::result::{ExecutionResult, ResultBuilder};

impl Invoker {
    /// Run one command to completion, blocking the calling thread.
    ///
    /// Do not call this from inside an async task; use
    /// [`invoke`](Self::invoke) with `sync` set instead.
    pub fn spawn_sync(&self, argv: impl Into<Argv>, options: ExecutionOptions) -> ExecutionResult {
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

        let slot = self.ctx.gate().try_acquire();
        if slot.is_none() {
            warn!(
                command = %plan.argv,
                limit = self.ctx.gate().limit(),
                "concurrency gate saturated; running blocking invocation without a slot"
            );
        }
        let result = self.launch_blocking(plan, builder);
        drop(slot);
        result
    }

    fn program_path_blocking(&self, plan: &LaunchPlan) -> Result<PathBuf, ProcessError> {
        if plan.safe {
            self.ctx.resolver().resolve_blocking(plan.program(), plan.cache)
        } else {
            Ok(PathBuf::from(plan.program()))
        }
    }

    fn launch_blocking(&self, plan: LaunchPlan, mut builder: ResultBuilder) -> ExecutionResult {
        let program = match self.program_path_blocking(&plan) {
            Ok(path) => path,
            Err(err) => {
                debug!(command = %plan.argv, error = %err, "resolution failed; not spawning");
                return builder.fail(err);
            }
        };

        let mut child = match plan.command(program.as_os_str()).spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(command = %plan.argv, program = %program.display(), error = %err, "spawn failed");
                return builder.fail(ProcessError::from_spawn(&program.to_string_lossy(), &err));
            }
        };
        builder.pid(Some(child.id()));
        info!(command = %plan.argv, pid = child.id(), "process started");

        let drain = |stream| Drain {
            stream,
            capture: plan.captures(),
            mirror: plan.mirrors(),
            prefix: plan.prefix.clone(),
        };

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (wait, out, err) = std::thread::scope(|s| {
            if let (Some(mut pipe), Some(bytes)) = (stdin, plan.stdin.as_deref()) {
                s.spawn(move || {
                    if let Err(e) = pipe.write_all(bytes) {
                        if e.kind() != ErrorKind::BrokenPipe {
                            warn!(error = %e, "failed to write child stdin");
                        }
                    }
                });
            }
            let out = stdout.map(|o| {
                let d = drain(Stream::Stdout);
                s.spawn(move || d.run_blocking(o))
            });
            let err = stderr.map(|e| {
                let d = drain(Stream::Stderr);
                s.spawn(move || d.run_blocking(e))
            });
            let wait = child.wait();
            (wait, join_output(out), join_output(err))
        });

        match wait {
            Ok(status) => builder.exit(status),
            Err(e) => builder.error(ProcessError::SpawnFailure {
                program: program.to_string_lossy().into_owned(),
                message: format!("waiting for process failed: {e}"),
            }),
        }
        if plan.captures() {
            builder.captured(Some(out), Some(err));
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

fn join_output(handle: Option<ScopedJoinHandle<'_, Vec<u8>>>) -> Vec<u8> {
    match handle.map(ScopedJoinHandle::join) {
        Some(Ok(bytes)) => bytes,
        Some(Err(_)) => {
            warn!("output reader thread panicked");
            Vec::new()
        }
        None => Vec::new(),
    }
}
