// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot store for the remembered login.
//!
//! Reads are self-healing: a slot that cannot be parsed or decoded is deleted
//! and reported as [`VaultError::NotFound`], so a corrupted record behaves
//! exactly like one that was never saved.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use credvault_core::{CodecVersion, CredentialRecord, KeyValueStore, RoleTag, VaultError, WriteBatch};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codec::CodecChain;
use crate::history::display_label;
use crate::keys::CREDENTIAL_SLOT_KEY;

/// The JSON layout persisted under `credential.slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub identifier: String,
    /// Encoded secret payload.
    pub secret: String,
    pub role: RoleTag,
    pub saved_at: DateTime<Utc>,
}

pub struct CredentialVault {
    store: Arc<dyn KeyValueStore>,
    codecs: Arc<CodecChain>,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn KeyValueStore>, codecs: Arc<CodecChain>) -> Self {
        Self { store, codecs }
    }

    /// Encode and persist `record`, replacing any previous one.
    pub fn save(&self, record: &CredentialRecord) -> Result<(), VaultError> {
        let stored = self.to_stored(record)?;
        self.write_stored(&stored)?;
        info!(
            store = %self.store.name(),
            role = %record.role,
            identifier = %display_label(&record.identifier, record.role),
            "credential saved"
        );
        Ok(())
    }

    /// Load and decode the remembered login.
    ///
    /// Returns `Err(NotFound)` when the slot is empty or was unusable (the slot
    /// is deleted in the latter case).
    pub fn load(&self) -> Result<CredentialRecord, VaultError> {
        let stored = match self.read_stored() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Err(not_found()),
            Err(VaultError::Decode { reason, .. }) => {
                warn!(store = %self.store.name(), %reason, "credential slot unreadable -- clearing");
                self.clear()?;
                return Err(not_found());
            }
            Err(e) => return Err(e),
        };

        match self.codecs.decode(&stored.secret) {
            Ok(decoded) => Ok(CredentialRecord {
                identifier: stored.identifier,
                secret: SecretString::from(decoded.plaintext.as_str().to_owned()),
                role: stored.role,
                saved_at: stored.saved_at,
            }),
            Err(e) => {
                warn!(
                    store = %self.store.name(),
                    identifier = %display_label(&stored.identifier, stored.role),
                    error = %e,
                    "credential secret undecodable -- clearing"
                );
                self.clear()?;
                Err(not_found())
            }
        }
    }

    /// Remove the slot. Clearing an empty slot is not an error.
    pub fn clear(&self) -> Result<(), VaultError> {
        self.store.remove(CREDENTIAL_SLOT_KEY)?;
        debug!(store = %self.store.name(), "credential slot cleared");
        Ok(())
    }

    /// The encoded secret payload currently stored, without decoding it.
    pub fn raw_payload(&self) -> Result<Option<String>, VaultError> {
        Ok(self.read_stored()?.map(|stored| stored.secret))
    }

    /// Read and parse the slot. A malformed slot is a `Decode` error.
    pub fn read_stored(&self) -> Result<Option<StoredCredential>, VaultError> {
        let Some(raw) = self.store.get(CREDENTIAL_SLOT_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| VaultError::Decode {
                codec: self.codecs.writer().version(),
                reason: format!("malformed credential slot: {e}"),
            })
    }

    /// Persist an already-encoded record as-is.
    pub fn write_stored(&self, stored: &StoredCredential) -> Result<(), VaultError> {
        let json = serde_json::to_string(stored)?;
        self.store.set(CREDENTIAL_SLOT_KEY, &json)
    }

    /// Queue the slot's new state into `batch`: a put of `record` encoded with
    /// this vault's writer codec, or a delete when `record` is `None`.
    pub fn stage(
        &self,
        record: Option<&CredentialRecord>,
        batch: &mut WriteBatch,
    ) -> Result<(), VaultError> {
        match record {
            Some(record) => {
                let stored = self.to_stored(record)?;
                batch.put(CREDENTIAL_SLOT_KEY, serde_json::to_string(&stored)?);
            }
            None => {
                batch.delete(CREDENTIAL_SLOT_KEY);
            }
        }
        Ok(())
    }

    /// The writer codec's version.
    pub fn writer_version(&self) -> CodecVersion {
        self.codecs.writer().version()
    }

    fn to_stored(&self, record: &CredentialRecord) -> Result<StoredCredential, VaultError> {
        if record.identifier.is_empty() {
            return Err(VaultError::Validation("identifier must not be empty".to_string()));
        }
        if record.secret.expose_secret().is_empty() {
            return Err(VaultError::Validation("secret must not be empty".to_string()));
        }
        let encoded = self.codecs.encode(record.secret.expose_secret())?;
        Ok(StoredCredential {
            identifier: record.identifier.clone(),
            secret: encoded.payload,
            role: record.role,
            saved_at: record.saved_at,
        })
    }
}

fn not_found() -> VaultError {
    VaultError::NotFound {
        key: CREDENTIAL_SLOT_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credvault_storage::MemoryStore;
    use credvault_test_utils::{legacy_v1_payload, stored_credential_json};

    fn vault() -> (Arc<MemoryStore>, CredentialVault) {
        let store = Arc::new(MemoryStore::new("test"));
        let vault = CredentialVault::new(store.clone(), Arc::new(CodecChain::obfuscated()));
        (store, vault)
    }

    #[test]
    fn save_then_load_roundtrips() {
        let (store, vault) = vault();
        let record = CredentialRecord::new("20230001", "hunter2", RoleTag::Student);
        vault.save(&record).unwrap();

        let raw = store.get(CREDENTIAL_SLOT_KEY).unwrap().unwrap();
        assert!(!raw.contains("hunter2"), "secret stored in the clear: {raw}");
        assert!(raw.contains("CSMU_ENC_V2:"));

        let loaded = vault.load().unwrap();
        assert_eq!(loaded.identifier, "20230001");
        assert_eq!(loaded.secret.expose_secret(), "hunter2");
        assert_eq!(loaded.role, RoleTag::Student);
        assert_eq!(loaded.saved_at, record.saved_at);
    }

    #[test]
    fn save_overwrites_previous_record() {
        let (_store, vault) = vault();
        vault.save(&CredentialRecord::new("A", "one", RoleTag::Student)).unwrap();
        vault.save(&CredentialRecord::new("B", "two", RoleTag::Teacher)).unwrap();
        let loaded = vault.load().unwrap();
        assert_eq!(loaded.identifier, "B");
        assert_eq!(loaded.role, RoleTag::Teacher);
    }

    #[test]
    fn empty_fields_are_rejected() {
        let (store, vault) = vault();
        let err = vault.save(&CredentialRecord::new("", "pw", RoleTag::Student)).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        let err = vault.save(&CredentialRecord::new("U1", "", RoleTag::Student)).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn empty_slot_is_not_found() {
        let (_store, vault) = vault();
        assert!(vault.load().unwrap_err().is_not_found());
    }

    #[test]
    fn undecodable_secret_self_heals() {
        let (store, vault) = vault();
        store
            .set(
                CREDENTIAL_SLOT_KEY,
                &stored_credential_json("U1", "CSMU_ENC_V2:%%%", "student", Utc::now()),
            )
            .unwrap();

        assert!(vault.load().unwrap_err().is_not_found());
        assert!(store.get(CREDENTIAL_SLOT_KEY).unwrap().is_none());
        assert!(vault.load().unwrap_err().is_not_found());
    }

    #[test]
    fn malformed_json_self_heals() {
        let (store, vault) = vault();
        store.set(CREDENTIAL_SLOT_KEY, "{not json").unwrap();
        assert!(vault.load().unwrap_err().is_not_found());
        assert!(store.get(CREDENTIAL_SLOT_KEY).unwrap().is_none());
    }

    #[test]
    fn legacy_secret_is_readable() {
        let (store, vault) = vault();
        store
            .set(
                CREDENTIAL_SLOT_KEY,
                &stored_credential_json("U1", &legacy_v1_payload("hunter2"), "admin", Utc::now()),
            )
            .unwrap();
        let loaded = vault.load().unwrap();
        assert_eq!(loaded.secret.expose_secret(), "hunter2");
        assert_eq!(loaded.role, RoleTag::Admin);
    }

    #[test]
    fn clear_is_idempotent() {
        let (_store, vault) = vault();
        vault.save(&CredentialRecord::new("U1", "pw", RoleTag::Student)).unwrap();
        vault.clear().unwrap();
        vault.clear().unwrap();
        assert!(vault.load().unwrap_err().is_not_found());
    }

    #[test]
    fn raw_payload_is_encoded_form() {
        let (_store, vault) = vault();
        assert_eq!(vault.raw_payload().unwrap(), None);
        vault.save(&CredentialRecord::new("U1", "pw", RoleTag::Student)).unwrap();
        let payload = vault.raw_payload().unwrap().unwrap();
        assert!(payload.starts_with("CSMU_ENC_V2:"));
    }

    #[test]
    fn stage_none_queues_delete() {
        let (_store, vault) = vault();
        let mut batch = WriteBatch::new();
        vault.stage(None, &mut batch).unwrap();
        assert_eq!(
            batch.ops(),
            &[credvault_core::WriteOp::Delete {
                key: CREDENTIAL_SLOT_KEY.to_string()
            }]
        );
    }
}
