// src/logging.rs

//! Logging setup for `procguard` using `tracing` + `tracing-subscriber`.
//!
//! The chosen level applies to procguard's own targets; everything else
//! (tokio internals, dependencies) stays at `warn`.
//!
//! Level source, first match wins:
//! 1. `--log-level`
//! 2. `PROCGUARD_LOG`: a bare level ("debug") or full filter directives
//!    ("procguard::resolve=trace,procguard=info")
//! 3. `info`
//!
//! Logs go to STDERR; stdout belongs to the child processes.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable read when no `--log-level` is given.
pub const ENV_LOG: &str = "PROCGUARD_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(ENV_LOG).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

/// Filter for the given CLI level and raw `PROCGUARD_LOG` value.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return crate_filter(level_from_log_level(lvl));
    }
    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_level_str(raw) {
            Some(level) => crate_filter(level),
            None => EnvFilter::try_new(raw).unwrap_or_else(|_| crate_filter(tracing::Level::INFO)),
        },
        None => crate_filter(tracing::Level::INFO),
    }
}

fn crate_filter(level: tracing::Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::new(format!("warn,{}={level}", env!("CARGO_CRATE_NAME")))
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(filter: EnvFilter) -> String {
        filter.to_string().to_lowercase()
    }

    #[test]
    fn level_strings_are_case_insensitive() {
        assert_eq!(parse_level_str(" DEBUG "), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level_str("warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }

    #[test]
    fn levels_apply_to_the_crate_target_only() {
        let got = rendered(build_filter(Some(LogLevel::Debug), Some("trace")));
        assert!(got.contains("procguard=debug"), "{got}");
        assert!(got.contains("warn"), "{got}");

        let got = rendered(build_filter(None, Some("trace")));
        assert!(got.contains("procguard=trace"), "{got}");

        let got = rendered(build_filter(None, None));
        assert!(got.contains("procguard=info"), "{got}");
    }

    #[test]
    fn env_accepts_full_directives() {
        let got = rendered(build_filter(None, Some("procguard::resolve=trace")));
        assert!(got.contains("procguard::resolve=trace"), "{got}");
    }
}
