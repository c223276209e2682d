// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local key-value store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use credvault_core::{KeyValueStore, VaultError, WriteBatch, WriteOp};

/// A [`KeyValueStore`] backed by an in-memory ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn poisoned(&self) -> VaultError {
        VaultError::storage(format!("memory store `{}` lock poisoned", self.name))
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let entries = self.entries.read().map_err(|_| self.poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, VaultError> {
        let entries = self.entries.read().map_err(|_| self.poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), VaultError> {
        // Holding the write lock for the whole batch makes it atomic to readers.
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), VaultError> {
        self.entries.write().map_err(|_| self.poisoned())?.clear();
        Ok(())
    }
}
