// src/resolve/special.rs

//! Resolution strategies for a fixed set of well-known paths.
//!
//! Each tool gets its own cache slot and candidate list:
//! 1. a dedicated override variable (a file or a directory),
//! 2. a hint next to the running binary (node only),
//! 3. the standard candidates (working directory + `PATH`),
//! 4. platform-specific install directories.
//!
//! Home and temp directories are derived from the environment instead of
//! being verified as executables.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::ProcessError;
use crate::resolve::cache::Slot;
use crate::resolve::candidates::{SearchEnv, standard_candidates, variants_in, variants_of};
use crate::types::Platform;

/// Override variable for the git resolver.
pub const ENV_GIT_PATH: &str = "GIT_PATH";

/// Override variable for the npm resolver.
pub const ENV_NPM_PATH: &str = "NPM_PATH";

const UNIX_INSTALL_DIRS: [&str; 4] = ["/usr/local/bin", "/usr/bin", "/opt/homebrew/bin", "/opt/local/bin"];

/// Directories reachable through the resolver by logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownDir {
    Home,
    Temp,
}

impl KnownDir {
    /// `home`, and `tmp` or `temp`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "home" => Some(KnownDir::Home),
            "tmp" | "temp" => Some(KnownDir::Temp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownTool {
    Git,
    Node,
    Npm,
}

impl WellKnownTool {
    pub const ALL: [WellKnownTool; 3] = [WellKnownTool::Git, WellKnownTool::Node, WellKnownTool::Npm];

    /// Dispatch a logical executable name to its dedicated resolver.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "git" => Some(WellKnownTool::Git),
            "node" => Some(WellKnownTool::Node),
            "npm" => Some(WellKnownTool::Npm),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WellKnownTool::Git => "git",
            WellKnownTool::Node => "node",
            WellKnownTool::Npm => "npm",
        }
    }

    pub fn slot(self) -> Slot {
        match self {
            WellKnownTool::Git => Slot::Git,
            WellKnownTool::Node => Slot::Node,
            WellKnownTool::Npm => Slot::Npm,
        }
    }

    pub fn override_var(self) -> Option<&'static str> {
        match self {
            WellKnownTool::Git => Some(ENV_GIT_PATH),
            WellKnownTool::Node => None,
            WellKnownTool::Npm => Some(ENV_NPM_PATH),
        }
    }

    pub fn not_found(self) -> ProcessError {
        let hint = match self {
            WellKnownTool::Git => format!("Install Git or set {ENV_GIT_PATH}."),
            WellKnownTool::Node => "Install Node.js or add it to PATH.".to_string(),
            WellKnownTool::Npm => format!("Install npm or set {ENV_NPM_PATH}."),
        };
        ProcessError::tool_not_found(self.name(), &hint)
    }

    /// Ordered, de-duplicated candidate list for this tool.
    pub fn candidates(self, env: &SearchEnv) -> Vec<PathBuf> {
        let name = self.name();
        let mut out = Vec::new();

        if let Some(var) = self.override_var() {
            if let Some(value) = env.var(var) {
                let value = PathBuf::from(value);
                out.extend(variants_of(&value, env.platform));
                out.extend(variants_in(&value, name, env.platform));
            }
        }

        if self == WellKnownTool::Node {
            if let Some(dir) = env.current_exe.as_deref().and_then(Path::parent) {
                out.extend(variants_in(dir, name, env.platform));
            }
        }

        out.extend(standard_candidates(name, env));
        out.extend(self.install_locations(env));

        dedup_in_order(out)
    }

    fn install_locations(self, env: &SearchEnv) -> Vec<PathBuf> {
        match env.platform {
            Platform::Unix => {
                let mut dirs: Vec<PathBuf> = UNIX_INSTALL_DIRS.iter().map(|d| PathBuf::from(*d)).collect();
                if let Some(home) = home_from_env(env) {
                    dirs.push(home.join("bin"));
                    dirs.push(home.join(".local").join("bin"));
                }
                dirs.into_iter().map(|d| d.join(self.name())).collect()
            }
            Platform::Windows => self.windows_install_locations(env),
        }
    }

    fn windows_install_locations(self, env: &SearchEnv) -> Vec<PathBuf> {
        let program_files = env
            .first_var_path(&["ProgramFiles", "ProgramW6432"])
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
        let program_files_x86 = env
            .var("ProgramFiles(x86)")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));
        let roots = [program_files, program_files_x86];

        match self {
            WellKnownTool::Git => {
                let mut out: Vec<PathBuf> = roots
                    .iter()
                    .flat_map(|root| {
                        [
                            root.join("Git").join("cmd").join("git.exe"),
                            root.join("Git").join("bin").join("git.exe"),
                        ]
                    })
                    .collect();
                if let Some(local) = env.var("LOCALAPPDATA") {
                    out.push(PathBuf::from(local).join("Programs").join("Git").join("cmd").join("git.exe"));
                }
                out
            }
            WellKnownTool::Node => roots.iter().map(|root| root.join("nodejs").join("node.exe")).collect(),
            WellKnownTool::Npm => {
                let mut out: Vec<PathBuf> =
                    roots.iter().map(|root| root.join("nodejs").join("npm.cmd")).collect();
                if let Some(appdata) = env.var("APPDATA") {
                    out.push(PathBuf::from(appdata).join("npm").join("npm.cmd"));
                }
                out
            }
        }
    }
}

fn dedup_in_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

/// Home directory from the environment.
pub fn home_from_env(env: &SearchEnv) -> Option<PathBuf> {
    match env.platform {
        Platform::Unix => env.first_var_path(&["HOME", "USERPROFILE"]),
        Platform::Windows => env.first_var_path(&["USERPROFILE", "HOME"]).or_else(|| {
            let drive = env.var("HOMEDRIVE")?;
            let path = env.var("HOMEPATH")?;
            let mut joined = drive.to_os_string();
            joined.push(path);
            Some(PathBuf::from(joined))
        }),
    }
}

/// Temp directory from the environment.
///
/// Order: `TMPDIR`, `TMP`, `TEMP`; then `tmp` (`temp` on Windows) under
/// `home`; then the platform default. The home subdirectory is returned
/// whether or not it exists yet.
pub fn temp_from_env(env: &SearchEnv, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = env.first_var_path(&["TMPDIR", "TMP", "TEMP"]) {
        return Some(dir);
    }

    if let Some(home) = home.filter(|h| !h.as_os_str().is_empty()) {
        let sub = match env.platform {
            Platform::Unix => "tmp",
            Platform::Windows => "temp",
        };
        return Some(home.join(sub));
    }

    let fallback = match env.platform {
        Platform::Unix => PathBuf::from("/tmp"),
        Platform::Windows => env
            .first_var_path(&["WINDIR", "SystemRoot"])
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"))
            .join("Temp"),
    };
    (!fallback.as_os_str().is_empty()).then_some(fallback)
}
