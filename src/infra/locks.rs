//! Per-path async locks
//!
//! Used by atomic write mode to allow at most one in-flight fetch per cache
//! entry. Table entries live only while some request holds or awaits them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<PathBuf, Arc<AsyncMutex<()>>>;

/// Table of async locks keyed by cache path
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    table: Arc<Mutex<LockTable>>,
}

/// Exclusive hold on one key, released on drop
#[derive(Debug)]
pub struct Lease {
    key: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<Mutex<LockTable>>,
}

impl KeyedLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &Path) -> Lease {
        let mutex = Arc::clone(
            lock_table(&self.table)
                .entry(key.to_path_buf())
                .or_default(),
        );
        let guard = mutex.lock_owned().await;

        Lease {
            key: key.to_path_buf(),
            guard: Some(guard),
            table: Arc::clone(&self.table),
        }
    }

    /// Number of keys currently held or awaited
    pub fn len(&self) -> usize {
        lock_table(&self.table).len()
    }

    /// Whether no key is held or awaited
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Lease {
    /// Key this lease holds
    pub fn key(&self) -> &Path {
        &self.key
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = lock_table(&self.table);
        // Only the table's own reference left: nobody else is waiting
        if table
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            table.remove(&self.key);
        }
    }
}

fn lock_table(table: &Mutex<LockTable>) -> MutexGuard<'_, LockTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
