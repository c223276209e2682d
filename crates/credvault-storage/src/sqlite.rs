// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespaced key-value store over the shared SQLite database.

use credvault_core::{KeyValueStore, VaultError, WriteBatch, WriteOp};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::database::Database;

const UPSERT_SQL: &str = "INSERT INTO kv_entries (namespace, key, value) VALUES (?1, ?2, ?3)
     ON CONFLICT (namespace, key) DO UPDATE SET
         value = excluded.value,
         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const DELETE_SQL: &str = "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2";

/// A [`KeyValueStore`] restricted to one namespace of a [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
    namespace: String,
    name: String,
}

impl SqliteStore {
    pub(crate) fn new(db: Database, namespace: &str) -> Self {
        Self {
            name: format!("sqlite:{namespace}"),
            namespace: namespace.to_string(),
            db,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl KeyValueStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.db.with_conn(|conn| {
            conn.execute(UPSERT_SQL, params![self.namespace, key, value])?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        self.db.with_conn(|conn| {
            conn.execute(DELETE_SQL, params![self.namespace, key])?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, VaultError> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT key FROM kv_entries WHERE namespace = ?1 ORDER BY key")?;
            let rows = stmt.query_map(params![self.namespace], |row| row.get(0))?;
            rows.collect()
        })
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), VaultError> {
        if batch.is_empty() {
            return Ok(());
        }
        let count = batch.len();
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            for op in batch.into_ops() {
                match op {
                    WriteOp::Put { key, value } => {
                        tx.execute(UPSERT_SQL, params![self.namespace, key, value])?;
                    }
                    WriteOp::Delete { key } => {
                        tx.execute(DELETE_SQL, params![self.namespace, key])?;
                    }
                }
            }
            tx.commit()
        })?;
        debug!(namespace = %self.namespace, ops = count, "write batch committed");
        Ok(())
    }

    fn clear(&self) -> Result<(), VaultError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM kv_entries WHERE namespace = ?1",
                params![self.namespace],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(namespace: &str) -> SqliteStore {
        Database::open_in_memory().unwrap().store(namespace)
    }

    #[test]
    fn set_get_remove() {
        let s = store("encrypted");
        assert_eq!(s.get("a").unwrap(), None);
        s.set("a", "1").unwrap();
        s.set("a", "2").unwrap();
        assert_eq!(s.get("a").unwrap().as_deref(), Some("2"));
        s.remove("a").unwrap();
        s.remove("a").unwrap();
        assert_eq!(s.get("a").unwrap(), None);
    }

    #[test]
    fn namespaces_are_isolated() {
        let db = Database::open_in_memory().unwrap();
        let a = db.store("encrypted");
        let b = db.store("plaintext");
        a.set("history.student", "[]").unwrap();
        b.set("history.teacher", "[]").unwrap();
        assert_eq!(a.keys().unwrap(), vec!["history.student".to_string()]);
        b.clear().unwrap();
        assert!(b.keys().unwrap().is_empty());
        assert_eq!(a.keys().unwrap().len(), 1);
    }

    #[test]
    fn batch_applies_puts_and_deletes() {
        let s = store("plaintext");
        s.set("old", "x").unwrap();
        let mut batch = WriteBatch::new();
        batch.put("new", "y").delete("old");
        s.apply(batch).unwrap();
        assert_eq!(s.keys().unwrap(), vec!["new".to_string()]);
    }

    #[test]
    fn store_name_includes_namespace() {
        assert_eq!(store("encrypted").name(), "sqlite:encrypted");
    }
}
