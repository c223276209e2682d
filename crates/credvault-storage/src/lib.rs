// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host stores for the credvault credential vault.
//!
//! [`MemoryStore`] keeps everything in a process-local map. [`Database`]
//! wraps one SQLite connection with embedded migrations and hands out
//! namespaced [`SqliteStore`] views, so both vault backends can share a
//! single database file without seeing each other's keys.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use credvault_config::model::{StorageBackend, StorageConfig};
use credvault_core::{BackendKind, KeyValueStore, VaultError};

/// Open one store per vault backend according to the storage configuration.
///
/// Returns `(encrypted, plaintext)`.
pub fn open_backend_stores(
    config: &StorageConfig,
) -> Result<(Arc<dyn KeyValueStore>, Arc<dyn KeyValueStore>), VaultError> {
    match config.backend {
        StorageBackend::Memory => Ok((
            Arc::new(MemoryStore::new(BackendKind::Encrypted.to_string())),
            Arc::new(MemoryStore::new(BackendKind::Plaintext.to_string())),
        )),
        StorageBackend::Sqlite => {
            let db = Database::open(&config.database_path, config.wal_mode)?;
            Ok((
                Arc::new(db.store(&BackendKind::Encrypted.to_string())),
                Arc::new(db.store(&BackendKind::Plaintext.to_string())),
            ))
        }
    }
}
