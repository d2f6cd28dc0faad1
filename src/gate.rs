// src/gate.rs

//! Process-wide bound on simultaneously active child processes.
//!
//! Admission is FIFO (Tokio's semaphore is fair). A slot is held for the
//! whole child lifecycle and released when the [`GateSlot`] is released or
//! dropped, so a failing child never keeps its slot and never pauses the
//! gate for anybody else.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// One unit of admission into the gate.
#[derive(Debug)]
pub struct GateSlot {
    _permit: OwnedSemaphorePermit,
}

impl GateSlot {
    /// Give the slot back. Equivalent to dropping it.
    pub fn release(self) {}
}

impl ConcurrencyGate {
    /// Create a gate admitting up to `limit` holders (at least one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Wait (FIFO) until a slot is free and take it.
    ///
    /// There is no timeout: a holder that never releases starves the gate.
    pub async fn acquire(&self) -> GateSlot {
        // The semaphore is never closed, so acquisition cannot fail.
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("concurrency gate semaphore is never closed"),
        };
        trace!(in_use = self.in_use(), limit = self.limit, "gate slot acquired");
        GateSlot { _permit: permit }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<GateSlot> {
        match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => Some(GateSlot { _permit: permit }),
            Err(TryAcquireError::NoPermits) | Err(TryAcquireError::Closed) => None,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.limit - self.available()
    }
}
