// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{CredvaultConfig, StorageBackend};

/// Upper bound on `vault.max_history`; history is a quick-pick list, not an archive.
pub const MAX_HISTORY_LIMIT: usize = 50;

/// Upper bound on `vault.history_expiry_days` (100 years).
pub const MAX_HISTORY_EXPIRY_DAYS: u32 = 36_500;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &CredvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.max_history == 0 || config.vault.max_history > MAX_HISTORY_LIMIT {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.max_history must be between 1 and {MAX_HISTORY_LIMIT}, got {}",
                config.vault.max_history
            ),
        });
    }

    if config.vault.history_expiry_days == 0
        || config.vault.history_expiry_days > MAX_HISTORY_EXPIRY_DAYS
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.history_expiry_days must be between 1 and {MAX_HISTORY_EXPIRY_DAYS}, got {}",
                config.vault.history_expiry_days
            ),
        });
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty when storage.backend = \"sqlite\""
                .to_string(),
        });
    }

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
