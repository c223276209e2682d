// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A vault backend: one host store paired with one codec chain.

use std::sync::Arc;
use std::time::{Duration, Instant};

use credvault_core::{BackendKind, KeyValueStore, RoleTag, VaultError};
use tracing::debug;

use crate::codec::CodecChain;
use crate::credential::CredentialVault;
use crate::history::{DEFAULT_MAX_HISTORY, HistoryStore};
use crate::keys::PROBE_KEY;
use crate::migration::MigrationCoordinator;

const PROBE_PLAINTEXT: &str = "credvault-probe";

/// Outcome of probing one backend's store.
#[derive(Debug, Clone)]
pub struct BackendCheck {
    pub backend: BackendKind,
    pub store: String,
    pub available: bool,
    pub error: Option<String>,
    pub duration: Duration,
}

pub struct Backend {
    kind: BackendKind,
    store: Arc<dyn KeyValueStore>,
    codecs: Arc<CodecChain>,
    credentials: CredentialVault,
    history: HistoryStore,
}

impl Backend {
    pub fn new(kind: BackendKind, store: Arc<dyn KeyValueStore>, max_history: usize) -> Self {
        let codecs = Arc::new(CodecChain::for_backend(kind));
        Self {
            kind,
            credentials: CredentialVault::new(store.clone(), codecs.clone()),
            history: HistoryStore::new(store.clone(), codecs.clone(), max_history),
            store,
            codecs,
        }
    }

    /// Obfuscating backend with the default history bound.
    pub fn encrypted(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(BackendKind::Encrypted, store, DEFAULT_MAX_HISTORY)
    }

    /// Identity backend with the default history bound.
    pub fn plaintext(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(BackendKind::Plaintext, store, DEFAULT_MAX_HISTORY)
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn codecs(&self) -> &CodecChain {
        &self.codecs
    }

    pub fn credentials(&self) -> &CredentialVault {
        &self.credentials
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn migration(&self) -> MigrationCoordinator<'_> {
        MigrationCoordinator::new(&self.codecs, &self.credentials, &self.history)
    }

    /// Remove the credential and every role's history.
    pub fn clear_all(&self) -> Result<(), VaultError> {
        self.credentials.clear()?;
        for role in RoleTag::ALL {
            self.history.clear(role)?;
        }
        Ok(())
    }

    /// Write, read back and delete an encoded value under the reserved probe
    /// key. Caller data is never read or written.
    pub fn probe(&self) -> Result<(), VaultError> {
        let encoded = self.codecs.encode(PROBE_PLAINTEXT)?;
        self.store.set(PROBE_KEY, &encoded.payload)?;
        let read_back = self.store.get(PROBE_KEY);
        let removed = self.store.remove(PROBE_KEY);

        let payload = read_back?.ok_or_else(|| self.unavailable("probe value vanished"))?;
        removed?;
        let decoded = self.codecs.decode(&payload)?;
        if decoded.plaintext.as_str() != PROBE_PLAINTEXT {
            return Err(self.unavailable("probe value did not round-trip"));
        }
        Ok(())
    }

    /// Timed [`probe`](Self::probe), folded into a report row.
    pub fn check(&self) -> BackendCheck {
        let start = Instant::now();
        let result = self.probe();
        let duration = start.elapsed();
        debug!(backend = %self.kind, store = %self.store.name(), ok = result.is_ok(), "backend probed");
        BackendCheck {
            backend: self.kind,
            store: self.store.name().to_string(),
            available: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            duration,
        }
    }

    fn unavailable(&self, reason: &str) -> VaultError {
        VaultError::BackendUnavailable {
            backend: self.kind.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credvault_core::CredentialRecord;
    use credvault_storage::MemoryStore;
    use credvault_test_utils::FlakyStore;

    #[test]
    fn probe_leaves_no_key_behind() {
        let store = Arc::new(MemoryStore::new("mem"));
        let backend = Backend::encrypted(store.clone());
        backend.probe().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn probe_does_not_touch_caller_data() {
        let store = Arc::new(MemoryStore::new("mem"));
        let backend = Backend::plaintext(store.clone());
        backend
            .credentials()
            .save(&CredentialRecord::new("U1", "pw", RoleTag::Student))
            .unwrap();
        let before = store.keys().unwrap();
        assert!(backend.check().available);
        assert_eq!(store.keys().unwrap(), before);
    }

    #[test]
    fn offline_store_fails_check() {
        let store = Arc::new(FlakyStore::new("flaky"));
        store.set_offline(true);
        let check = Backend::encrypted(store).check();
        assert!(!check.available);
        assert!(check.error.unwrap().contains("offline"));
        assert_eq!(check.store, "flaky");
    }

    #[test]
    fn clear_all_removes_vault_keys() {
        let store = Arc::new(MemoryStore::new("mem"));
        let backend = Backend::encrypted(store.clone());
        backend
            .credentials()
            .save(&CredentialRecord::new("U1", "pw", RoleTag::Student))
            .unwrap();
        backend
            .history()
            .upsert(&credvault_core::Login::new("U1", "pw"), RoleTag::Teacher)
            .unwrap();
        store.set("unrelated", "x").unwrap();
        backend.clear_all().unwrap();
        assert_eq!(store.keys().unwrap(), vec!["unrelated".to_string()]);
    }
}
