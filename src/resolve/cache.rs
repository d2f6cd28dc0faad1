// src/resolve/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

/// Named single-slot entries kept alongside the per-name map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Home,
    Temp,
    Git,
    Node,
    Npm,
}

/// In-memory cache of verified executable paths.
///
/// Only the resolver writes here, and only with paths that passed the
/// executable verifier (or, for home/temp, that were derived from the
/// environment). Concurrent writers always write the same value for a given
/// key, so last-writer-wins is fine.
#[derive(Debug, Default)]
pub struct PathCache {
    named: RwLock<HashMap<String, PathBuf>>,
    slots: RwLock<HashMap<Slot, PathBuf>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<PathBuf> {
        let hit = read(&self.named).get(name).cloned();
        if hit.is_some() {
            debug!(name, "path cache hit");
        }
        hit
    }

    pub fn insert(&self, name: &str, path: &Path) {
        debug!(name, path = %path.display(), "caching resolved path");
        write(&self.named).insert(name.to_string(), path.to_path_buf());
    }

    pub fn slot(&self, slot: Slot) -> Option<PathBuf> {
        read(&self.slots).get(&slot).cloned()
    }

    pub fn set_slot(&self, slot: Slot, path: &Path) {
        debug!(?slot, path = %path.display(), "caching well-known path");
        write(&self.slots).insert(slot, path.to_path_buf());
    }

    pub fn len(&self) -> usize {
        read(&self.named).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every cached path.
    pub fn clear(&self) {
        write(&self.named).clear();
        write(&self.slots).clear();
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
