// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault facade: two injected backends and an explicit active selection.

use std::collections::BTreeMap;

use credvault_config::model::VaultConfig;
use credvault_config::CredvaultConfig;
use credvault_core::{
    BackendKind, CredentialRecord, HistoryItem, Login, RoleTag, VaultError, WriteBatch,
};
use tracing::{debug, info};

use crate::backend::{Backend, BackendCheck};
use crate::history::DEFAULT_EXPIRY_DAYS;
use crate::migration::MigrationReport;

/// Per-backend availability plus the mode the manager is running in.
#[derive(Debug, Clone)]
pub struct AvailabilityReport {
    pub current: BackendKind,
    pub checks: Vec<BackendCheck>,
}

impl AvailabilityReport {
    pub fn is_available(&self, kind: BackendKind) -> bool {
        self.checks.iter().any(|c| c.backend == kind && c.available)
    }

    pub fn all_available(&self) -> bool {
        self.checks.iter().all(|c| c.available)
    }

    /// `{ backend: available }`.
    pub fn as_map(&self) -> BTreeMap<BackendKind, bool> {
        self.checks.iter().map(|c| (c.backend, c.available)).collect()
    }
}

/// Result of a self-healing sweep over the active backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub mode: BackendKind,
    pub has_credentials: bool,
    /// Decodable entries per role after compaction.
    pub history_counts: BTreeMap<RoleTag, usize>,
}

/// Snapshot of what the active backend holds, without decoding anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub mode: BackendKind,
    pub store: String,
    pub total_keys: usize,
    pub has_credentials: bool,
    pub history_counts: BTreeMap<RoleTag, usize>,
}

/// What [`VaultManager::open`] did.
#[derive(Debug)]
pub struct OpenSummary {
    pub migration: MigrationReport,
    pub pruned: usize,
}

pub struct VaultManager {
    encrypted: Backend,
    plaintext: Backend,
    active: BackendKind,
    expiry_days: u32,
    prune_on_open: bool,
}

impl VaultManager {
    /// Assemble a manager over two backends. `use_encryption` picks the
    /// initially active one.
    pub fn new(encrypted: Backend, plaintext: Backend, use_encryption: bool) -> Self {
        Self {
            encrypted,
            plaintext,
            active: BackendKind::from_encryption_flag(use_encryption),
            expiry_days: DEFAULT_EXPIRY_DAYS,
            prune_on_open: true,
        }
    }

    /// Apply the `[vault]` settings that govern open-time maintenance.
    pub fn with_vault_config(mut self, config: &VaultConfig) -> Self {
        self.expiry_days = config.history_expiry_days;
        self.prune_on_open = config.prune_on_open;
        self
    }

    /// Open the configured stores and build a manager over them.
    pub fn from_config(config: &CredvaultConfig) -> Result<Self, VaultError> {
        let (encrypted, plaintext) = credvault_storage::open_backend_stores(&config.storage)?;
        let max = config.vault.max_history;
        let manager = Self::new(
            Backend::new(BackendKind::Encrypted, encrypted, max),
            Backend::new(BackendKind::Plaintext, plaintext, max),
            config.vault.encryption,
        )
        .with_vault_config(&config.vault);
        info!(mode = %manager.active, store = %manager.active().store().name(), "vault manager ready");
        Ok(manager)
    }

    /// Open-time maintenance on the active backend: migrate every stale
    /// record, then prune expired history when configured to.
    pub fn open(&self) -> Result<OpenSummary, VaultError> {
        let migration = self.active().migration().migrate_all()?;
        let pruned = if self.prune_on_open {
            self.prune_expired(self.expiry_days)?
        } else {
            0
        };
        if !migration.is_noop() || pruned > 0 {
            info!(
                migrated = migration.migrated.len(),
                dropped = migration.dropped.len(),
                pruned,
                "vault opened"
            );
        }
        Ok(OpenSummary { migration, pruned })
    }

    pub fn current_mode(&self) -> BackendKind {
        self.active
    }

    pub fn backend(&self, kind: BackendKind) -> &Backend {
        match kind {
            BackendKind::Encrypted => &self.encrypted,
            BackendKind::Plaintext => &self.plaintext,
        }
    }

    pub fn active(&self) -> &Backend {
        self.backend(self.active)
    }

    pub fn save_credentials(&self, record: &CredentialRecord) -> Result<(), VaultError> {
        self.active().credentials().save(record)
    }

    /// Load the remembered login, migrating its format first.
    pub fn get_credentials(&self) -> Result<CredentialRecord, VaultError> {
        let backend = self.active();
        backend.migration().migrate_vault_record()?;
        backend.credentials().load()
    }

    pub fn clear_credentials(&self) -> Result<(), VaultError> {
        self.active().credentials().clear()
    }

    pub fn add_history(&self, login: &Login, role: RoleTag) -> Result<(), VaultError> {
        self.active().history().upsert(login, role)
    }

    /// List `role`'s history, migrating its format first.
    pub fn get_history(&self, role: RoleTag) -> Result<Vec<HistoryItem>, VaultError> {
        let backend = self.active();
        backend.migration().migrate_history(role)?;
        backend.history().list(role)
    }

    pub fn remove_history(&self, identifier: &str, role: RoleTag) -> Result<(), VaultError> {
        self.active().history().remove(identifier, role)
    }

    pub fn clear_history(&self, role: RoleTag) -> Result<(), VaultError> {
        self.active().history().clear(role)
    }

    /// Forget the credential and every role's history on the active backend.
    pub fn clear_all(&self) -> Result<(), VaultError> {
        self.active().clear_all()?;
        info!(mode = %self.active, "vault cleared");
        Ok(())
    }

    pub fn prune_expired(&self, max_age_days: u32) -> Result<usize, VaultError> {
        self.active().history().prune_expired(max_age_days)
    }

    /// Run a full migration pass over the active backend.
    pub fn migrate(&self) -> Result<MigrationReport, VaultError> {
        self.active().migration().migrate_all()
    }

    /// Make `target` the active backend.
    ///
    /// With `migrate_data`, the target is first made to mirror the current
    /// backend in a single atomic batch: the credential and every role's
    /// history are re-encoded with the target's writer, timestamps and order
    /// kept, and anything absent from the source is deleted from the target.
    /// The active backend only changes once that batch has committed.
    pub fn switch_backend(&mut self, target: BackendKind, migrate_data: bool) -> Result<(), VaultError> {
        if target == self.active {
            debug!(mode = %target, "backend already active");
            return Ok(());
        }

        if migrate_data {
            let source = self.active();
            let dest = self.backend(target);
            source.migration().migrate_all()?;

            let record = match source.credentials().load() {
                Ok(record) => Some(record),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            };
            let mut batch = WriteBatch::new();
            dest.credentials().stage(record.as_ref(), &mut batch)?;
            for role in RoleTag::ALL {
                let items = source.history().list(role)?;
                dest.history().stage(role, &items, &mut batch)?;
            }
            let ops = batch.len();
            dest.store().apply(batch)?;
            info!(from = %self.active, to = %target, ops, "vault data copied to target backend");
        }

        info!(from = %self.active, to = %target, "backend switched");
        self.active = target;
        Ok(())
    }

    /// Probe every backend's store with a throwaway value.
    pub fn check_availability(&self) -> AvailabilityReport {
        AvailabilityReport {
            current: self.active,
            checks: BackendKind::ALL
                .iter()
                .map(|kind| self.backend(*kind).check())
                .collect(),
        }
    }

    /// Read everything on the active backend through the self-healing paths,
    /// purging whatever no longer decodes.
    pub fn validate_integrity(&self) -> Result<IntegrityReport, VaultError> {
        let has_credentials = match self.get_credentials() {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(e),
        };
        let mut history_counts = BTreeMap::new();
        for role in RoleTag::ALL {
            history_counts.insert(role, self.get_history(role)?.len());
        }
        Ok(IntegrityReport {
            mode: self.active,
            has_credentials,
            history_counts,
        })
    }

    pub fn storage_stats(&self) -> Result<StorageStats, VaultError> {
        let backend = self.active();
        let mut history_counts = BTreeMap::new();
        for role in RoleTag::ALL {
            history_counts.insert(role, backend.history().raw_entries(role)?.len());
        }
        Ok(StorageStats {
            mode: self.active,
            store: backend.store().name().to_string(),
            total_keys: backend.store().keys()?.len(),
            has_credentials: backend.credentials().raw_payload()?.is_some(),
            history_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use credvault_storage::MemoryStore;
    use secrecy::ExposeSecret;

    fn manager(use_encryption: bool) -> VaultManager {
        VaultManager::new(
            Backend::encrypted(Arc::new(MemoryStore::new("encrypted"))),
            Backend::plaintext(Arc::new(MemoryStore::new("plaintext"))),
            use_encryption,
        )
    }

    #[test]
    fn flag_selects_initial_backend() {
        assert_eq!(manager(true).current_mode(), BackendKind::Encrypted);
        assert_eq!(manager(false).current_mode(), BackendKind::Plaintext);
    }

    #[test]
    fn operations_hit_only_the_active_backend() {
        let vault = manager(true);
        vault
            .save_credentials(&CredentialRecord::new("U1", "pw", RoleTag::Student))
            .unwrap();
        assert!(vault.backend(BackendKind::Plaintext).store().keys().unwrap().is_empty());
        assert_eq!(vault.get_credentials().unwrap().secret.expose_secret(), "pw");
    }

    #[test]
    fn switch_without_migration_only_repoints() {
        let mut vault = manager(true);
        vault
            .save_credentials(&CredentialRecord::new("U1", "pw", RoleTag::Student))
            .unwrap();
        vault.switch_backend(BackendKind::Plaintext, false).unwrap();
        assert_eq!(vault.current_mode(), BackendKind::Plaintext);
        assert!(vault.get_credentials().unwrap_err().is_not_found());
    }

    #[test]
    fn switch_to_active_backend_is_noop() {
        let mut vault = manager(false);
        vault.switch_backend(BackendKind::Plaintext, true).unwrap();
        assert_eq!(vault.current_mode(), BackendKind::Plaintext);
    }

    #[test]
    fn stats_and_integrity() {
        let vault = manager(true);
        vault
            .save_credentials(&CredentialRecord::new("U1", "pw", RoleTag::Student))
            .unwrap();
        vault.add_history(&Login::new("U1", "pw"), RoleTag::Student).unwrap();
        vault.add_history(&Login::new("T1", "pw"), RoleTag::Teacher).unwrap();

        let stats = vault.storage_stats().unwrap();
        assert_eq!(stats.mode, BackendKind::Encrypted);
        assert_eq!(stats.total_keys, 3);
        assert!(stats.has_credentials);
        assert_eq!(stats.history_counts[&RoleTag::Student], 1);
        assert_eq!(stats.history_counts[&RoleTag::Admin], 0);

        let integrity = vault.validate_integrity().unwrap();
        assert!(integrity.has_credentials);
        assert_eq!(integrity.history_counts[&RoleTag::Teacher], 1);
    }

    #[test]
    fn availability_reports_both_backends() {
        let vault = manager(true);
        let report = vault.check_availability();
        assert_eq!(report.current, BackendKind::Encrypted);
        assert!(report.all_available());
        assert_eq!(report.as_map().len(), 2);
    }

    #[test]
    fn clear_all_empties_active_backend() {
        let vault = manager(true);
        vault
            .save_credentials(&CredentialRecord::new("U1", "pw", RoleTag::Student))
            .unwrap();
        vault.add_history(&Login::new("U1", "pw"), RoleTag::Student).unwrap();
        vault.clear_all().unwrap();
        assert_eq!(vault.storage_stats().unwrap().total_keys, 0);
    }
}
