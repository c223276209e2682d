// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous key-value store trait for vault backends.

use crate::error::VaultError;

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: String, value: String },
    Delete { key: String },
}

/// An ordered set of mutations applied atomically by [`KeyValueStore::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write of `value` under `key`.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queue removal of `key`.
    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// The host store a vault backend persists into.
///
/// Implementations are synchronous and local. All values are strings (the
/// vault serializes its records as JSON before writing).
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name used in logs and availability reports.
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), VaultError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), VaultError>;

    /// List every key currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>, VaultError>;

    /// Apply every operation in `batch`, or none of them.
    fn apply(&self, batch: WriteBatch) -> Result<(), VaultError>;

    /// Remove every key owned by this store.
    fn clear(&self) -> Result<(), VaultError> {
        let mut batch = WriteBatch::new();
        for key in self.keys()? {
            batch.delete(key);
        }
        self.apply(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_preserves_operation_order() {
        let mut batch = WriteBatch::new();
        batch.put("a", "1").delete("b").put("c", "3");
        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.ops()[1],
            WriteOp::Delete {
                key: "b".to_string()
            }
        );
    }

    #[test]
    fn empty_batch_reports_empty() {
        assert!(WriteBatch::new().is_empty());
    }
}
