// src/config/model.rs

use serde::Deserialize;

use crate::types::VerifyStrategy;

/// Default bound for simultaneously active child processes.
pub const DEFAULT_MAX_OPEN_PROCESSES: usize = 100;

/// Default number of stdout/stderr lines quoted in a non-zero exit error.
pub const DEFAULT_OUTPUT_TAIL_LINES: usize = 40;

/// Environment variable overriding [`Settings::max_open_processes`].
pub const ENV_MAX_OPEN_PROCESSES: &str = "PROCGUARD_MAX_OPEN_PROCESSES";

/// Environment variable overriding [`Settings::verify_strategy`].
pub const ENV_VERIFY: &str = "PROCGUARD_VERIFY";

/// Process-wide settings, optionally read from a TOML file:
///
/// ```toml
/// max_open_processes = 32
/// verify_strategy = "probe"
/// output_tail_lines = 20
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Upper bound on concurrently active child processes.
    pub max_open_processes: usize,

    /// How candidate executables are verified.
    pub verify_strategy: VerifyStrategy,

    /// Lines of captured output kept in a non-zero exit message.
    /// `0` keeps everything.
    pub output_tail_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_open_processes: DEFAULT_MAX_OPEN_PROCESSES,
            verify_strategy: VerifyStrategy::default(),
            output_tail_lines: DEFAULT_OUTPUT_TAIL_LINES,
        }
    }
}

impl Settings {
    /// Same settings with a different process bound.
    pub fn with_max_open_processes(mut self, limit: usize) -> Self {
        self.max_open_processes = limit;
        self
    }

    pub fn with_verify_strategy(mut self, strategy: VerifyStrategy) -> Self {
        self.verify_strategy = strategy;
        self
    }
}
