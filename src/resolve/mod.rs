// src/resolve/mod.rs

//! Executable path resolution.
//!
//! - [`candidates`] builds ordered candidate lists (working directory,
//!   `PATH`, Windows extension variants).
//! - [`verify`] decides whether a candidate can be executed.
//! - [`special`] holds the dedicated strategies for git, node, npm and the
//!   home/temp directories.
//! - [`cache`] remembers verified results for the life of the process.
//!
//! [`PathResolver`] ties them together. Lookup order for a name:
//! absolute path (returned as is) → home/temp directory → dedicated tool
//! resolver → cache → first verified candidate.

pub mod cache;
pub mod candidates;
pub mod special;
pub mod verify;

use std::path::PathBuf;

use tracing::debug;

use crate::errors::ProcessError;

pub use cache::{PathCache, Slot};
pub use candidates::{SearchEnv, is_absolute_name, standard_candidates};
pub use special::{KnownDir, WellKnownTool};
pub use verify::{ExecutableVerifier, SystemVerifier, Verdict};

/// Where a successful lookup is remembered.
#[derive(Debug, Clone)]
enum Store {
    Named(String),
    Slot(Slot),
}

/// Outcome of the cheap, non-probing part of a lookup.
#[derive(Debug)]
enum Lookup {
    Done(Result<PathBuf, ProcessError>),
    Probe {
        candidates: Vec<PathBuf>,
        store: Option<Store>,
        on_miss: ProcessError,
    },
}

/// Resolves logical names to verified absolute paths.
#[derive(Debug)]
pub struct PathResolver<'a> {
    cache: &'a PathCache,
    verifier: &'a dyn ExecutableVerifier,
    env: SearchEnv,
}

impl<'a> PathResolver<'a> {
    pub fn new(cache: &'a PathCache, verifier: &'a dyn ExecutableVerifier, env: SearchEnv) -> Self {
        Self { cache, verifier, env }
    }

    pub fn env(&self) -> &SearchEnv {
        &self.env
    }

    /// Resolve `name`, verifying candidates without blocking the runtime.
    pub async fn resolve(&self, name: &str, use_cache: bool) -> Result<PathBuf, ProcessError> {
        match self.lookup(name, use_cache) {
            Lookup::Done(result) => result,
            Lookup::Probe {
                candidates,
                store,
                on_miss,
            } => {
                for candidate in candidates {
                    if self.verifier.is_executable(&candidate).await {
                        return Ok(self.found(name, candidate, store));
                    }
                }
                debug!(name, "no candidate verified");
                Err(on_miss)
            }
        }
    }

    /// Blocking variant of [`resolve`](Self::resolve).
    pub fn resolve_blocking(&self, name: &str, use_cache: bool) -> Result<PathBuf, ProcessError> {
        match self.lookup(name, use_cache) {
            Lookup::Done(result) => result,
            Lookup::Probe {
                candidates,
                store,
                on_miss,
            } => {
                for candidate in candidates {
                    if self.verifier.is_executable_blocking(&candidate) {
                        return Ok(self.found(name, candidate, store));
                    }
                }
                debug!(name, "no candidate verified");
                Err(on_miss)
            }
        }
    }

    /// Home directory (cached in its own slot).
    pub fn home_path(&self, use_cache: bool) -> Result<PathBuf, ProcessError> {
        if use_cache {
            if let Some(hit) = self.cache.slot(Slot::Home) {
                return Ok(hit);
            }
        }
        let home = special::home_from_env(&self.env).ok_or_else(|| ProcessError::NotFound {
            name: "home".to_string(),
            message: "Could not determine the home directory (HOME/USERPROFILE unset)".to_string(),
        })?;
        if use_cache {
            self.cache.set_slot(Slot::Home, &home);
        }
        Ok(home)
    }

    /// Temp directory (cached in its own slot).
    pub fn temp_path(&self, use_cache: bool) -> Result<PathBuf, ProcessError> {
        if use_cache {
            if let Some(hit) = self.cache.slot(Slot::Temp) {
                return Ok(hit);
            }
        }
        let home = self.home_path(use_cache).ok();
        let temp = special::temp_from_env(&self.env, home.as_deref()).ok_or_else(|| {
            ProcessError::NotFound {
                name: "temp".to_string(),
                message: "Could not determine a temporary directory".to_string(),
            }
        })?;
        if use_cache {
            self.cache.set_slot(Slot::Temp, &temp);
        }
        Ok(temp)
    }

    fn lookup(&self, name: &str, use_cache: bool) -> Lookup {
        if name.trim().is_empty() {
            return Lookup::Done(Err(ProcessError::InvalidCommand {
                message: "empty executable name".to_string(),
            }));
        }

        // An explicit absolute path is the caller's assertion.
        if is_absolute_name(name, self.env.platform) {
            return Lookup::Done(Ok(PathBuf::from(name)));
        }

        match KnownDir::from_name(name) {
            Some(KnownDir::Home) => return Lookup::Done(self.home_path(use_cache)),
            Some(KnownDir::Temp) => return Lookup::Done(self.temp_path(use_cache)),
            None => {}
        }

        if let Some(tool) = WellKnownTool::from_name(name) {
            if use_cache {
                if let Some(hit) = self.cache.slot(tool.slot()) {
                    debug!(name, "well-known path cache hit");
                    return Lookup::Done(Ok(hit));
                }
            }
            return Lookup::Probe {
                candidates: tool.candidates(&self.env),
                store: use_cache.then_some(Store::Slot(tool.slot())),
                on_miss: tool.not_found(),
            };
        }

        if use_cache {
            if let Some(hit) = self.cache.get(name) {
                return Lookup::Done(Ok(hit));
            }
        }

        Lookup::Probe {
            candidates: standard_candidates(name, &self.env),
            store: use_cache.then(|| Store::Named(name.to_string())),
            on_miss: ProcessError::not_found(name),
        }
    }

    fn found(&self, name: &str, path: PathBuf, store: Option<Store>) -> PathBuf {
        debug!(name, path = %path.display(), "resolved executable");
        match store {
            Some(Store::Named(key)) => self.cache.insert(&key, &path),
            Some(Store::Slot(slot)) => self.cache.set_slot(slot, &path),
            None => {}
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    #[test]
    fn home_and_temp_use_their_own_slots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tmp")).unwrap();
        let env = SearchEnv::empty(Platform::Unix, "/").with_var("HOME", dir.path());

        let cache = PathCache::new();
        let verifier = SystemVerifier::default();
        let resolver = PathResolver::new(&cache, &verifier, env);

        assert_eq!(resolver.home_path(true).unwrap(), dir.path());
        assert_eq!(resolver.temp_path(true).unwrap(), dir.path().join("tmp"));
        assert_eq!(cache.slot(Slot::Temp), Some(dir.path().join("tmp")));
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_home_is_not_found() {
        let cache = PathCache::new();
        let verifier = SystemVerifier::default();
        let resolver = PathResolver::new(&cache, &verifier, SearchEnv::empty(Platform::Unix, "/"));
        assert!(resolver.home_path(false).unwrap_err().is_not_found());
        // Temp still falls through to the platform default.
        assert_eq!(resolver.temp_path(false).unwrap(), PathBuf::from("/tmp"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let cache = PathCache::new();
        let verifier = SystemVerifier::default();
        let resolver = PathResolver::new(&cache, &verifier, SearchEnv::empty(Platform::Unix, "/"));
        assert!(matches!(
            resolver.resolve_blocking("  ", true),
            Err(ProcessError::InvalidCommand { .. })
        ));
    }
}
