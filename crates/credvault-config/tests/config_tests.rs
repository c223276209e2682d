// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the credvault configuration system.

use credvault_config::diagnostic::ConfigError;
use credvault_config::model::StorageBackend;
use credvault_config::{load_and_validate_str, load_config_from_str};

/// A fully specified file deserializes into every section.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[vault]
encryption = false
max_history = 8
history_expiry_days = 14
prune_on_open = false

[storage]
backend = "sqlite"
database_path = "/tmp/credvault-test.db"
wal_mode = false

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert!(!config.vault.encryption);
    assert_eq!(config.vault.max_history, 8);
    assert_eq!(config.vault.history_expiry_days, 14);
    assert!(!config.vault.prune_on_open);
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    assert_eq!(config.storage.database_path, "/tmp/credvault-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.log.level, "debug");
}

/// Partial files keep defaults for everything unspecified.
#[test]
fn partial_toml_keeps_defaults() {
    let config = load_config_from_str("[vault]\nencryption = false\n").unwrap();
    assert!(!config.vault.encryption);
    assert_eq!(config.vault.max_history, 5);
    assert_eq!(config.vault.history_expiry_days, 30);
}

/// A misspelled key surfaces as UnknownKey with a suggestion.
#[test]
fn unknown_key_produces_suggestion() {
    let errors = load_and_validate_str("[vault]\nmax_histroy = 3\n").expect_err("should reject");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("expected an UnknownKey error");
    assert_eq!(unknown.0, "max_histroy");
    assert_eq!(unknown.1.as_deref(), Some("max_history"));
}

/// Unknown top-level sections are rejected too.
#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n").expect_err("should reject");
    let msg = err.to_string();
    assert!(
        msg.contains("unknown field") || msg.contains("telemetry"),
        "error should mention the bad section, got: {msg}"
    );
}

/// Wrong value type produces InvalidType.
#[test]
fn wrong_type_produces_invalid_type() {
    let errors =
        load_and_validate_str("[vault]\nencryption = \"sometimes\"\n").expect_err("should reject");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))));
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let errors = load_and_validate_str("[vault]\nmax_history = 0\n").expect_err("should reject");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("max_history"))
    ));
}

/// Config errors render through miette without panicking.
#[test]
fn errors_render_as_diagnostics() {
    use miette::Diagnostic;

    let errors = load_and_validate_str("[log]\nlevel = \"loud\"\n").unwrap_err();
    let code = errors[0].code().map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("credvault::config::validation"));
    credvault_config::render_errors(&errors);
}
