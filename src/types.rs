use std::str::FromStr;
use serde::Deserialize;

/// How the executable verifier decides whether a candidate can be run.
///
/// - `Auto`: use the direct permission check where the OS offers one
///   (Unix), otherwise fall back to the launch probe (default).
/// - `Probe`: always try to launch the candidate with `--version` and
///   classify the launch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStrategy {
    Auto,
    Probe,
}

impl Default for VerifyStrategy {
    fn default() -> Self {
        VerifyStrategy::Auto
    }
}

impl FromStr for VerifyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(VerifyStrategy::Auto),
            "probe" => Ok(VerifyStrategy::Probe),
            other => Err(format!(
                "invalid verify_strategy: {other} (expected \"auto\" or \"probe\")"
            )),
        }
    }
}

/// Platform flavour used when building candidate paths.
///
/// Kept separate from `cfg!(windows)` so Windows-style lookups can be
/// exercised on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Separator used by the `PATH` variable on this platform.
    pub fn path_list_separator(self) -> char {
        match self {
            Platform::Unix => ':',
            Platform::Windows => ';',
        }
    }
}
