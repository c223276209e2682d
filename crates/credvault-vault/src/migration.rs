// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-place upgrade of stale-format records to the writer codec.
//!
//! Each record or entry moves `Unmigrated -> Migrated` (re-encoded with the
//! writer) or `Unmigrated -> Dropped` (unrecoverable, deleted). Values the
//! writer already recognizes are left alone, which makes every pass
//! idempotent and safe to re-run after a crash.

use credvault_core::{HistoryEntry, RoleTag, VaultError};
use tracing::{debug, info, warn};

use crate::codec::CodecChain;
use crate::credential::{CredentialVault, StoredCredential};
use crate::history::HistoryStore;
use crate::keys::{CREDENTIAL_SLOT_KEY, history_key};

/// What happened to the remembered credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Nothing stored.
    Empty,
    /// Already in the writer's format.
    AlreadyMigrated,
    /// Re-encoded with the writer codec.
    Migrated,
    /// Unrecoverable; the slot was deleted.
    Dropped,
}

/// Result of migrating one role's history collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMigration {
    pub role: RoleTag,
    /// Display labels of re-encoded entries.
    pub migrated: Vec<String>,
    /// Display labels of discarded entries.
    pub dropped: Vec<String>,
    /// Entries already in the writer's format.
    pub unchanged: usize,
}

impl HistoryMigration {
    fn new(role: RoleTag) -> Self {
        Self {
            role,
            migrated: Vec::new(),
            dropped: Vec::new(),
            unchanged: 0,
        }
    }

    /// True if at least one entry changed state.
    pub fn changed(&self) -> bool {
        !self.migrated.is_empty() || !self.dropped.is_empty()
    }
}

/// Report of a full migration pass over one backend.
#[derive(Debug)]
pub struct MigrationReport {
    pub credential: MigrationOutcome,
    /// Names of migrated items (`credential.slot`, `history.<role>:<label>`).
    pub migrated: Vec<String>,
    /// Names of dropped items.
    pub dropped: Vec<String>,
    /// Non-fatal warnings (e.g. a role whose history had to be cleared).
    pub warnings: Vec<String>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.migrated.is_empty() && self.dropped.is_empty() && self.warnings.is_empty()
    }
}

enum Transition {
    Current,
    Upgraded(String),
    Unrecoverable(VaultError),
}

pub struct MigrationCoordinator<'a> {
    codecs: &'a CodecChain,
    credentials: &'a CredentialVault,
    history: &'a HistoryStore,
}

impl<'a> MigrationCoordinator<'a> {
    pub fn new(codecs: &'a CodecChain, credentials: &'a CredentialVault, history: &'a HistoryStore) -> Self {
        Self {
            codecs,
            credentials,
            history,
        }
    }

    fn transition(&self, payload: &str) -> Transition {
        if self.codecs.is_current(payload) {
            return Transition::Current;
        }
        let reencoded = self
            .codecs
            .decode(payload)
            .and_then(|decoded| self.codecs.encode(&decoded.plaintext));
        match reencoded {
            Ok(encoded) => Transition::Upgraded(encoded.payload),
            Err(e) => Transition::Unrecoverable(e),
        }
    }

    /// Upgrade the remembered credential, or drop it if unrecoverable.
    pub fn migrate_vault_record(&self) -> Result<MigrationOutcome, VaultError> {
        let stored = match self.credentials.read_stored() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(MigrationOutcome::Empty),
            Err(VaultError::Decode { reason, .. }) => {
                warn!(%reason, "credential slot unreadable during migration -- dropping");
                self.credentials.clear()?;
                return Ok(MigrationOutcome::Dropped);
            }
            Err(e) => return Err(e),
        };

        let from = self.codecs.classify(&stored.secret);
        match self.transition(&stored.secret) {
            Transition::Current => Ok(MigrationOutcome::AlreadyMigrated),
            Transition::Upgraded(secret) => {
                self.credentials.write_stored(&StoredCredential { secret, ..stored })?;
                info!(from = ?from, to = %self.credentials.writer_version(), "credential migrated");
                Ok(MigrationOutcome::Migrated)
            }
            Transition::Unrecoverable(e) => {
                warn!(error = %e, "credential unrecoverable during migration -- dropping");
                self.credentials.clear()?;
                Ok(MigrationOutcome::Dropped)
            }
        }
    }

    /// Upgrade every entry of one role's history. Persists only on change.
    pub fn migrate_history(&self, role: RoleTag) -> Result<HistoryMigration, VaultError> {
        let entries = self.history.raw_entries(role)?;
        let mut outcome = HistoryMigration::new(role);
        let mut kept: Vec<HistoryEntry> = Vec::with_capacity(entries.len());

        for entry in entries {
            match self.transition(&entry.encoded_secret) {
                Transition::Current => {
                    outcome.unchanged += 1;
                    kept.push(entry);
                }
                Transition::Upgraded(encoded_secret) => {
                    debug!(
                        role = %role,
                        identifier = %entry.display_label,
                        from = ?self.codecs.classify(&entry.encoded_secret),
                        "history entry re-encoded"
                    );
                    outcome.migrated.push(entry.display_label.clone());
                    kept.push(HistoryEntry {
                        encoded_secret,
                        ..entry
                    });
                }
                Transition::Unrecoverable(e) => {
                    warn!(
                        role = %role,
                        identifier = %entry.display_label,
                        error = %e,
                        "history entry unrecoverable -- dropping"
                    );
                    outcome.dropped.push(entry.display_label);
                }
            }
        }

        if outcome.changed() {
            self.history.replace_entries(role, &kept)?;
            info!(
                role = %role,
                migrated = outcome.migrated.len(),
                dropped = outcome.dropped.len(),
                "history migrated"
            );
        }
        Ok(outcome)
    }

    /// Migrate the credential and every role's history.
    ///
    /// A storage failure while migrating one role clears that role's history
    /// and is recorded as a warning; the pass continues with the next role.
    pub fn migrate_all(&self) -> Result<MigrationReport, VaultError> {
        let credential = self.migrate_vault_record()?;
        let mut report = MigrationReport {
            credential,
            migrated: Vec::new(),
            dropped: Vec::new(),
            warnings: Vec::new(),
        };
        match credential {
            MigrationOutcome::Migrated => report.migrated.push(CREDENTIAL_SLOT_KEY.to_string()),
            MigrationOutcome::Dropped => report.dropped.push(CREDENTIAL_SLOT_KEY.to_string()),
            MigrationOutcome::Empty | MigrationOutcome::AlreadyMigrated => {}
        }

        for role in RoleTag::ALL {
            match self.migrate_history(role) {
                Ok(outcome) => {
                    let key = history_key(role);
                    report
                        .migrated
                        .extend(outcome.migrated.iter().map(|label| format!("{key}:{label}")));
                    report
                        .dropped
                        .extend(outcome.dropped.iter().map(|label| format!("{key}:{label}")));
                }
                Err(e) => {
                    let mut warning = format!("history migration failed for {role}: {e}");
                    if let Err(clear_err) = self.history.clear(role) {
                        warning.push_str(&format!("; clearing it also failed: {clear_err}"));
                    }
                    warn!("{}", warning);
                    report.warnings.push(warning);
                }
            }
        }

        Ok(report)
    }
}
