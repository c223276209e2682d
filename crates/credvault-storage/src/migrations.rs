// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! every time a [`crate::Database`] is opened.

use credvault_core::VaultError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), VaultError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(VaultError::storage)?;
    for migration in report.applied_migrations() {
        tracing::debug!(version = migration.version(), name = %migration.name(), "schema migration applied");
    }
    Ok(())
}
