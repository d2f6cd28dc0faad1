// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `procguard`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procguard",
    version,
    about = "Resolve executables safely and run them under a process limit.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a settings file (TOML).
    ///
    /// Without one, defaults plus `PROCGUARD_*` environment overrides apply.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCGUARD_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one command (argv form, no shell).
    Run(RunArgs),

    /// Run a command line through the platform shell.
    Sh {
        /// Prefix for every mirrored output line.
        #[arg(long, value_name = "TEXT")]
        prefix: Option<String>,

        /// The command line, passed to the shell as one string.
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        line: Vec<String>,
    },

    /// Run several commands with bounded concurrency.
    Batch {
        /// Commands in flight at once.
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// One whitespace-separated command per argument.
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Print the resolved path of each executable name.
    Which {
        /// Bypass the path cache.
        #[arg(long)]
        no_cache: bool,

        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Report whether a path is an executable the current user may run.
    Check {
        /// Launch the candidate instead of checking permissions.
        #[arg(long)]
        probe: bool,

        path: PathBuf,
    },

    /// Print the resolved home and temp directories.
    Paths,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Spawn argv[0] as given, skipping path resolution.
    #[arg(long)]
    pub no_safe: bool,

    /// Bypass the path cache during resolution.
    #[arg(long)]
    pub no_cache: bool,

    /// Discard the child's output.
    #[arg(long, conflicts_with = "prefix")]
    pub quiet: bool,

    /// Mirror output with this prefix on every line.
    #[arg(long, value_name = "TEXT")]
    pub prefix: Option<String>,

    /// Bytes written to the child's stdin.
    #[arg(long, value_name = "TEXT")]
    pub stdin: Option<String>,

    /// Working directory for the child.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    #[arg(required = true, num_args = 1.., last = true)]
    pub argv: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
