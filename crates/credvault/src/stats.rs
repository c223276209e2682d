// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `credvault stats` command implementation.

use std::collections::BTreeMap;

use credvault_core::{BackendKind, RoleTag, VaultError};
use credvault_vault::{StorageStats, VaultManager};
use serde::Serialize;

/// Structured stats output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub mode: BackendKind,
    pub store: String,
    pub total_keys: usize,
    pub has_credentials: bool,
    pub history: BTreeMap<RoleTag, usize>,
}

impl From<StorageStats> for StatsResponse {
    fn from(stats: StorageStats) -> Self {
        Self {
            mode: stats.mode,
            store: stats.store,
            total_keys: stats.total_keys,
            has_credentials: stats.has_credentials,
            history: stats.history_counts,
        }
    }
}

/// Run the `credvault stats` command.
pub fn run_stats(vault: &VaultManager, json: bool) -> Result<(), VaultError> {
    let response = StatsResponse::from(vault.storage_stats()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("mode:        {}", response.mode);
    println!("store:       {}", response.store);
    println!("keys:        {}", response.total_keys);
    println!(
        "remembered:  {}",
        if response.has_credentials { "yes" } else { "no" }
    );
    for (role, count) in &response.history {
        println!("{:<12} {count}", format!("{role}:"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_lowercase_names() {
        let response = StatsResponse {
            mode: BackendKind::Plaintext,
            store: "sqlite:plaintext".into(),
            total_keys: 2,
            has_credentials: true,
            history: BTreeMap::from([(RoleTag::Student, 1), (RoleTag::Teacher, 0)]),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["mode"], "plaintext");
        assert_eq!(value["history"]["student"], 1);
    }
}
