// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ProcessError`] is the classified failure attached to an
//!   [`ExecutionResult`](crate::exec::ExecutionResult) or returned by the
//!   path resolver. It is `Clone` so batch results can share it.
//! - [`ProcguardError`] covers the ambient surfaces (settings, IO, CLI).

use std::path::PathBuf;

use thiserror::Error;

/// Why an invocation or a path lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// No candidate path verified as executable.
    #[error("{message}")]
    NotFound { name: String, message: String },

    /// The OS refused to execute the file because of access rights.
    #[error("Permission denied executing {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// The process-creation call itself failed.
    #[error("Failed to spawn {program}: {message}")]
    SpawnFailure { program: String, message: String },

    /// The child ran and exited with a non-zero status.
    #[error("{message}")]
    NonZeroExit { status: i32, message: String },

    /// The request could not be turned into a command (e.g. empty argv).
    #[error("Invalid command: {message}")]
    InvalidCommand { message: String },
}

impl ProcessError {
    /// Generic "could not locate" error used by the path resolver.
    pub fn not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("Could not locate the {name} executable path");
        Self::NotFound { name, message }
    }

    /// Tool-specific "could not locate" error with a hint for the user.
    pub fn tool_not_found(name: impl Into<String>, hint: &str) -> Self {
        let name = name.into();
        let message = format!("Could not locate the {name} executable path. {hint}");
        Self::NotFound { name, message }
    }

    /// Classify an `io::Error` returned by the process-creation call.
    pub fn from_spawn(program: &str, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path: PathBuf::from(program),
            }
        } else {
            Self::SpawnFailure {
                program: program.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Exit status carried by a `NonZeroExit`, if any.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ProcguardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcguardError>;
