// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the credvault credential vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level credvault configuration.
///
/// Every section is optional and defaults to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredvaultConfig {
    /// Vault behavior: backend selection and history bounds.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Host store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Vault behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Start on the encrypted backend (`true`) or the plaintext one.
    #[serde(default = "default_encryption")]
    pub encryption: bool,

    /// Maximum history entries kept per role.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// History entries older than this many days are pruned.
    #[serde(default = "default_history_expiry_days")]
    pub history_expiry_days: u32,

    /// Prune expired history when the vault is opened.
    #[serde(default = "default_prune_on_open")]
    pub prune_on_open: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            encryption: default_encryption(),
            max_history: default_max_history(),
            history_expiry_days: default_history_expiry_days(),
            prune_on_open: default_prune_on_open(),
        }
    }
}

fn default_encryption() -> bool {
    true
}

fn default_max_history() -> usize {
    5
}

fn default_history_expiry_days() -> u32 {
    30
}

fn default_prune_on_open() -> bool {
    true
}

/// Which host store backs the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Process-local memory; nothing survives a restart.
    Memory,
}

/// Host store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Store implementation.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("credvault").join("vault.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vault.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level filter (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
