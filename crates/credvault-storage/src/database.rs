// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! One [`Database`] owns one connection behind a mutex. Every
//! [`SqliteStore`] handed out by [`Database::store`] shares it, so all writes
//! go through a single connection.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use credvault_core::VaultError;
use rusqlite::Connection;
use tracing::debug;

use crate::sqlite::SqliteStore;

/// Shared handle to the vault database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .finish()
    }
}

impl Database {
    /// Open (or create) the database file at `path` and run migrations.
    pub fn open(path: &str, wal_mode: bool) -> Result<Self, VaultError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(VaultError::storage)?;
            }
        }

        let mut conn = Connection::open(path).map_err(map_sqlite_err)?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(map_sqlite_err)?;
        if wal_mode {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(map_sqlite_err)?;
            debug!(journal_mode = %mode, "journal mode set");
        }
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(map_sqlite_err)?;
        crate::migrations::run_migrations(&mut conn)?;

        debug!(path = %path, "vault database opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: path.to_string(),
        })
    }

    /// Open a private in-memory database (tests and ephemeral runs).
    pub fn open_in_memory() -> Result<Self, VaultError> {
        let mut conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        crate::migrations::run_migrations(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: ":memory:".to_string(),
        })
    }

    /// A key-value view restricted to `namespace`.
    pub fn store(&self, namespace: &str) -> SqliteStore {
        SqliteStore::new(self.clone(), namespace)
    }

    /// Where the database lives (`:memory:` for in-memory databases).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run `f` with exclusive access to the connection.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, VaultError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| VaultError::storage("vault database mutex poisoned"))?;
        f(&mut conn).map_err(map_sqlite_err)
    }
}

/// Convert rusqlite errors into the vault error type.
///
/// Errors meaning the file itself cannot be used map to
/// [`VaultError::BackendUnavailable`]; everything else is a storage error.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> VaultError {
    use rusqlite::ErrorCode;

    let unavailable = matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::CannotOpen | ErrorCode::PermissionDenied | ErrorCode::ReadOnly)
    );
    if unavailable {
        VaultError::BackendUnavailable {
            backend: "sqlite".to_string(),
            reason: e.to_string(),
        }
    } else {
        VaultError::storage(e)
    }
}
