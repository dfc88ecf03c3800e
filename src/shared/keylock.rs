//! Per-key async mutexes
//!
//! Every mutating engine operation is a read-validate-write sequence
//! against one ledger key (a lot's capacity counter, a discount code's
//! use counter, the refund sum of a transaction). [`KeyLocks`] serializes
//! those sequences per key so two concurrent requests cannot interleave
//! between read and write.
//!
//! Callers namespace their keys (`lot:…`, `code:…`, `refund:…`) to keep
//! unrelated aggregates from contending.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of named async mutexes; locks are created on first use and
/// kept for the lifetime of the registry.
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for one key
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Acquire two keys, always in lexicographic order so concurrent
    /// pair-acquisitions cannot deadlock. Returns one guard when the keys
    /// are equal.
    pub async fn acquire_pair(
        &self,
        a: &str,
        b: &str,
    ) -> (OwnedMutexGuard<()>, Option<OwnedMutexGuard<()>>) {
        if a == b {
            return (self.acquire(a).await, None);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_guard = self.acquire(first).await;
        let second_guard = self.acquire(second).await;
        (first_guard, Some(second_guard))
    }
}

// ── Tests ──────────────────────────────────────────────────────
