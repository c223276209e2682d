// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the credvault credential vault.
//!
//! This crate provides the error taxonomy, the domain types shared by every
//! other crate (credential records, history entries, encoded values, role
//! tags), and the [`KeyValueStore`] trait that storage backends implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VaultError;
pub use traits::{KeyValueStore, WriteBatch, WriteOp};
pub use types::{
    BackendKind, CodecVersion, CredentialRecord, EncodedValue, HistoryEntry, HistoryItem, Login,
    RoleTag,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_error_has_all_variants() {
        let _validation = VaultError::Validation("empty identifier".into());
        let _decode = VaultError::Decode {
            codec: CodecVersion::V2,
            reason: "bad base64".into(),
        };
        let _not_found = VaultError::NotFound {
            key: "credential.slot".into(),
        };
        let _unavailable = VaultError::BackendUnavailable {
            backend: "memory".into(),
            reason: "offline".into(),
        };
        let _storage = VaultError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        let _config = VaultError::Config("bad flag".into());
    }

    #[test]
    fn not_found_is_recognized() {
        let err = VaultError::NotFound {
            key: "credential.slot".into(),
        };
        assert!(err.is_not_found());
        assert!(!VaultError::Validation("x".into()).is_not_found());
    }

    #[test]
    fn role_tag_round_trips_through_display() {
        use std::str::FromStr;

        for role in RoleTag::ALL {
            let s = role.to_string();
            let parsed = RoleTag::from_str(&s).expect("should parse back");
            assert_eq!(role, parsed);
        }
        assert_eq!(RoleTag::Student.to_string(), "student");
    }

    #[test]
    fn backend_kind_serializes_lowercase() {
        let json = serde_json::to_string(&BackendKind::Plaintext).unwrap();
        assert_eq!(json, "\"plaintext\"");
        let parsed: BackendKind = serde_json::from_str("\"encrypted\"").unwrap();
        assert_eq!(parsed, BackendKind::Encrypted);
    }
}
