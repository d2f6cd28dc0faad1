#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use procguard::config::Settings;
use procguard::exec::{EnvPolicy, ExecutionOptions, StdioWiring};
use procguard::resolve::{ExecutableVerifier, SearchEnv};
use procguard::{Invoker, SpawnContext};

/// Builder for `ExecutionOptions` to simplify test setup.
pub struct OptionsBuilder {
    options: ExecutionOptions,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: ExecutionOptions::default(),
        }
    }

    /// Start from options that capture stdout/stderr.
    pub fn captured() -> Self {
        Self {
            options: ExecutionOptions::captured(),
        }
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.options.stdin = Some(bytes.into());
        self
    }

    pub fn empty_env(mut self) -> Self {
        self.options.env = EnvPolicy::Empty;
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        let mut vars = match std::mem::take(&mut self.options.env) {
            EnvPolicy::Exact(vars) => vars,
            _ => BTreeMap::new(),
        };
        vars.insert(key.to_string(), value.to_string());
        self.options.env = EnvPolicy::Exact(vars);
        self
    }

    pub fn null_stdio(mut self) -> Self {
        self.options.stdio = Some(StdioWiring::null());
        self
    }

    pub fn unsafe_spawn(mut self) -> Self {
        self.options.safe = false;
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.options.cache = false;
        self
    }

    pub fn mirror(mut self, prefix: &str) -> Self {
        self.options.output = true;
        self.options.output_prefix = Some(prefix.to_string());
        self
    }

    pub fn sync(mut self) -> Self {
        self.options.sync = true;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.options.concurrency = n;
        self
    }

    pub fn build(self) -> ExecutionOptions {
        self.options
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoker on a fresh context so caches and gate counts stay per-test.
pub fn invoker_with_limit(max_open_processes: usize) -> Invoker {
    let ctx = SpawnContext::new(Settings::default().with_max_open_processes(max_open_processes));
    Invoker::new(Arc::new(ctx))
}

/// Fresh context with a fixed lookup environment and verifier.
pub fn isolated_context(env: SearchEnv, verifier: Arc<dyn ExecutableVerifier>) -> SpawnContext {
    SpawnContext::new(Settings::default())
        .with_search_env(env)
        .with_verifier(verifier)
}
