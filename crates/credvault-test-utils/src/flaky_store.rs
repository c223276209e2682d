// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fault-injecting key-value store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use credvault_core::{KeyValueStore, VaultError, WriteBatch};
use credvault_storage::MemoryStore;

/// A [`MemoryStore`] wrapper whose failures are switched on from tests.
///
/// - `set_offline(true)` makes every operation return `BackendUnavailable`.
/// - `fail_next_apply()` makes the next batch commit fail without writing
///   anything, leaving the store exactly as it was.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryStore,
    offline: AtomicBool,
    fail_applies: AtomicUsize,
}

impl FlakyStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: MemoryStore::new(name),
            offline: AtomicBool::new(false),
            fail_applies: AtomicUsize::new(0),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail the next batch commit.
    pub fn fail_next_apply(&self) {
        self.fail_applies.fetch_add(1, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), VaultError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(VaultError::BackendUnavailable {
                backend: self.inner.name().to_string(),
                reason: "store is offline".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        self.check_online()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.check_online()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        self.check_online()?;
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, VaultError> {
        self.check_online()?;
        self.inner.keys()
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), VaultError> {
        self.check_online()?;
        let armed = self
            .fail_applies
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(VaultError::storage(format!(
                "injected commit failure ({} ops discarded)",
                batch.len()
            )));
        }
        self.inner.apply(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_store_reports_unavailable() {
        let store = FlakyStore::new("flaky");
        store.set_offline(true);
        let err = store.set("k", "v").unwrap_err();
        assert!(matches!(err, VaultError::BackendUnavailable { .. }));
        store.set_offline(false);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn failed_apply_writes_nothing_and_disarms() {
        let store = FlakyStore::new("flaky");
        store.fail_next_apply();
        let mut batch = WriteBatch::new();
        batch.put("a", "1");
        assert!(store.apply(batch.clone()).is_err());
        assert!(store.keys().unwrap().is_empty());
        store.apply(batch).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string()]);
    }
}
