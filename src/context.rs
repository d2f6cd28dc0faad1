// src/context.rs

//! Shared state behind every invocation: one path cache, one concurrency
//! gate and one executable verifier.
//!
//! Callers normally use [`SpawnContext::global`]; tests build a fresh
//! context so caches and gate counts never leak between them.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::Settings;
use crate::errors::ProcessError;
use crate::gate::ConcurrencyGate;
use crate::resolve::{ExecutableVerifier, PathCache, PathResolver, SearchEnv, SystemVerifier};

#[derive(Debug)]
pub struct SpawnContext {
    settings: Settings,
    cache: PathCache,
    gate: ConcurrencyGate,
    verifier: Arc<dyn ExecutableVerifier>,
    /// Fixed lookup environment; the live process environment when `None`.
    search_env: Option<SearchEnv>,
}

static GLOBAL: OnceLock<Arc<SpawnContext>> = OnceLock::new();

impl SpawnContext {
    pub fn new(settings: Settings) -> Self {
        let verifier = Arc::new(SystemVerifier::new(settings.verify_strategy));
        Self {
            gate: ConcurrencyGate::new(settings.max_open_processes),
            cache: PathCache::new(),
            verifier,
            search_env: None,
            settings,
        }
    }

    /// Process-wide default context, built from the environment on first use.
    pub fn global() -> Arc<SpawnContext> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SpawnContext::new(Settings::from_env()))))
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn ExecutableVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_search_env(mut self, env: SearchEnv) -> Self {
        self.search_env = Some(env);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    pub fn verifier(&self) -> &dyn ExecutableVerifier {
        self.verifier.as_ref()
    }

    pub fn search_env(&self) -> SearchEnv {
        self.search_env.clone().unwrap_or_else(SearchEnv::capture)
    }

    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.cache, self.verifier.as_ref(), self.search_env())
    }

    pub async fn resolve_executable_path(&self, name: &str) -> Result<PathBuf, ProcessError> {
        self.resolver().resolve(name, true).await
    }

    pub fn resolve_executable_path_blocking(&self, name: &str) -> Result<PathBuf, ProcessError> {
        self.resolver().resolve_blocking(name, true)
    }

    pub async fn is_executable(&self, path: &Path) -> bool {
        self.verifier.is_executable(path).await
    }

    pub fn is_executable_blocking(&self, path: &Path) -> bool {
        self.verifier.is_executable_blocking(path)
    }

    pub fn home_path(&self) -> Result<PathBuf, ProcessError> {
        self.resolver().home_path(true)
    }

    pub fn temp_path(&self) -> Result<PathBuf, ProcessError> {
        self.resolver().temp_path(true)
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
