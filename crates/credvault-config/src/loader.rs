// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./credvault.toml` > `~/.config/credvault/credvault.toml` >
//! `/etc/credvault/credvault.toml`, with `CREDVAULT_*` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CredvaultConfig;

/// Config file name searched in every directory of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "credvault.toml";

const SYSTEM_CONFIG_PATH: &str = "/etc/credvault/credvault.toml";

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/credvault/credvault.toml`
/// 3. `~/.config/credvault/credvault.toml`
/// 4. `./credvault.toml`
/// 5. `CREDVAULT_*` environment variables
pub fn load_config() -> Result<CredvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CredvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CredvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CredvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CredvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CredvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Every config file location, lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(user) = user_config_path() {
        paths.push(user);
    }
    let local = std::env::current_dir()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));
    paths.push(local);
    paths
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("credvault").join(CONFIG_FILE_NAME))
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CREDVAULT_VAULT_MAX_HISTORY` must map to `vault.max_history`.
/// `CREDVAULT_SECRET` carries a password for the CLI prompt, not configuration.
fn env_provider() -> Env {
    Env::prefixed("CREDVAULT_").ignore(&["secret"]).map(|key| {
        let mapped = key
            .as_str()
            .replacen("vault_", "vault.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
