// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, recency-ordered login history, one collection per role.
//!
//! Every mutation ends with the same normalization step: sort by
//! `last_access_at` descending, then truncate to the configured bound. Entries
//! whose secret no longer decodes are compacted away lazily on `list`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use credvault_core::{HistoryEntry, HistoryItem, KeyValueStore, Login, RoleTag, VaultError, WriteBatch};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::codec::CodecChain;
use crate::keys::history_key;

/// Default number of entries kept per role.
pub const DEFAULT_MAX_HISTORY: usize = 5;

/// Default expiry window, in days, for [`HistoryStore::prune_expired`].
pub const DEFAULT_EXPIRY_DAYS: u32 = 30;

const MASK: &str = "****";

/// Masked form of `identifier` shown in pickers and logs.
///
/// Teachers are shown as `Teacher <identifier>`. Other identifiers longer than
/// six characters keep their first four and last two characters.
pub fn display_label(identifier: &str, role: RoleTag) -> String {
    if role == RoleTag::Teacher {
        return format!("Teacher {identifier}");
    }
    let chars: Vec<char> = identifier.chars().collect();
    if chars.len() <= 6 {
        return identifier.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{MASK}{tail}")
}

/// Sort newest first and drop everything past `max`.
fn normalize(entries: &mut Vec<HistoryEntry>, max: usize) {
    entries.sort_by(|a, b| b.last_access_at.cmp(&a.last_access_at));
    entries.truncate(max);
}

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    codecs: Arc<CodecChain>,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>, codecs: Arc<CodecChain>, max_entries: usize) -> Self {
        Self {
            store,
            codecs,
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record a successful login, refreshing an existing entry for the same
    /// identifier instead of adding a duplicate.
    pub fn upsert(&self, login: &Login, role: RoleTag) -> Result<(), VaultError> {
        let entry = self.encode_entry(&login.identifier, &login.secret, role, login.at)?;
        let mut entries = self.raw_entries(role)?;

        match entries.iter().position(|e| e.identifier == login.identifier) {
            Some(index) => entries[index] = entry,
            None => entries.insert(0, entry),
        }
        normalize(&mut entries, self.max_entries);

        self.replace_entries(role, &entries)?;
        debug!(
            role = %role,
            identifier = %display_label(&login.identifier, role),
            size = entries.len(),
            "history entry upserted"
        );
        Ok(())
    }

    /// Decoded entries for `role`, newest first. Undecodable entries are
    /// omitted and removed from the persisted collection.
    pub fn list(&self, role: RoleTag) -> Result<Vec<HistoryItem>, VaultError> {
        let entries = self.raw_entries(role)?;
        let total = entries.len();
        let mut kept = Vec::with_capacity(total);
        let mut items = Vec::with_capacity(total);

        for entry in entries {
            match self.codecs.decode(&entry.encoded_secret) {
                Ok(decoded) => {
                    items.push(HistoryItem {
                        identifier: entry.identifier.clone(),
                        secret: SecretString::from(decoded.plaintext.as_str().to_owned()),
                        role: entry.role,
                        last_access_at: entry.last_access_at,
                        display_label: entry.display_label.clone(),
                    });
                    kept.push(entry);
                }
                Err(e) => {
                    warn!(
                        role = %role,
                        identifier = %entry.display_label,
                        error = %e,
                        "dropping undecodable history entry"
                    );
                }
            }
        }

        if kept.len() != total {
            self.replace_entries(role, &kept)?;
            info!(role = %role, dropped = total - kept.len(), "history compacted");
        }
        Ok(items)
    }

    /// Remove the entry for `identifier`, if present.
    pub fn remove(&self, identifier: &str, role: RoleTag) -> Result<(), VaultError> {
        let mut entries = self.raw_entries(role)?;
        entries.retain(|e| e.identifier != identifier);
        self.replace_entries(role, &entries)
    }

    /// Remove the whole collection for `role`.
    pub fn clear(&self, role: RoleTag) -> Result<(), VaultError> {
        self.store.remove(&history_key(role))
    }

    /// Drop entries older than `max_age_days` across every role.
    pub fn prune_expired(&self, max_age_days: u32) -> Result<usize, VaultError> {
        match Duration::try_days(i64::from(max_age_days)) {
            Some(max_age) => self.prune_expired_at(Utc::now(), max_age),
            None => Ok(0),
        }
    }

    /// [`prune_expired`](Self::prune_expired) against an explicit clock.
    /// Returns the number of entries removed. A window reaching past the
    /// earliest representable time expires nothing.
    pub fn prune_expired_at(&self, now: DateTime<Utc>, max_age: Duration) -> Result<usize, VaultError> {
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            debug!(max_age_days = max_age.num_days(), "expiry window exceeds clock range");
            return Ok(0);
        };
        let mut pruned = 0;
        for role in RoleTag::ALL {
            let mut entries = self.raw_entries(role)?;
            let before = entries.len();
            entries.retain(|e| e.last_access_at >= cutoff);
            if entries.len() != before {
                pruned += before - entries.len();
                self.replace_entries(role, &entries)?;
            }
        }
        if pruned > 0 {
            info!(pruned, "expired history entries pruned");
        }
        Ok(pruned)
    }

    /// The persisted collection for `role`, secrets still encoded.
    ///
    /// A collection that is not valid JSON is unrecoverable as a whole; it is
    /// removed and reported as empty.
    pub fn raw_entries(&self, role: RoleTag) -> Result<Vec<HistoryEntry>, VaultError> {
        let key = history_key(role);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(role = %role, error = %e, "history collection malformed -- clearing");
                self.store.remove(&key)?;
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the collection for `role`. An empty collection removes the key.
    pub fn replace_entries(&self, role: RoleTag, entries: &[HistoryEntry]) -> Result<(), VaultError> {
        let key = history_key(role);
        if entries.is_empty() {
            return self.store.remove(&key);
        }
        let json = serde_json::to_string(entries)?;
        self.store.set(&key, &json)
    }

    /// Queue `items` as the new collection for `role` into `batch`, encoded
    /// with this store's writer codec. Timestamps and labels are kept; an empty
    /// list queues a delete.
    pub fn stage(&self, role: RoleTag, items: &[HistoryItem], batch: &mut WriteBatch) -> Result<(), VaultError> {
        let mut entries = items
            .iter()
            .map(|item| self.encode_entry(&item.identifier, &item.secret, role, item.last_access_at))
            .collect::<Result<Vec<_>, _>>()?;
        normalize(&mut entries, self.max_entries);

        let key = history_key(role);
        if entries.is_empty() {
            batch.delete(key);
        } else {
            batch.put(key, serde_json::to_string(&entries)?);
        }
        Ok(())
    }

    fn encode_entry(
        &self,
        identifier: &str,
        secret: &SecretString,
        role: RoleTag,
        at: DateTime<Utc>,
    ) -> Result<HistoryEntry, VaultError> {
        if identifier.is_empty() {
            return Err(VaultError::Validation("identifier must not be empty".to_string()));
        }
        let encoded = self.codecs.encode(secret.expose_secret())?;
        Ok(HistoryEntry {
            identifier: identifier.to_string(),
            encoded_secret: encoded.payload,
            role,
            last_access_at: at,
            display_label: display_label(identifier, role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credvault_storage::MemoryStore;
    use credvault_test_utils::legacy_v1_payload;

    fn history(max: usize) -> (Arc<MemoryStore>, HistoryStore) {
        let store = Arc::new(MemoryStore::new("test"));
        let history = HistoryStore::new(store.clone(), Arc::new(CodecChain::obfuscated()), max);
        (store, history)
    }

    fn login(id: &str, minutes_ago: i64) -> Login {
        Login::new(id, format!("pw-{id}")).at(Utc::now() - Duration::minutes(minutes_ago))
    }

    fn ids(items: &[HistoryItem]) -> Vec<&str> {
        items.iter().map(|i| i.identifier.as_str()).collect()
    }

    #[test]
    fn labels() {
        assert_eq!(display_label("20230001", RoleTag::Student), "2023****01");
        assert_eq!(display_label("T001", RoleTag::Teacher), "Teacher T001");
        assert_eq!(display_label("abcdef", RoleTag::Admin), "abcdef");
        assert_eq!(display_label("学号一二三四五", RoleTag::Student), "学号一二****四五");
    }

    #[test]
    fn bounded_to_five_newest_first() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        for (i, id) in ["U1", "U2", "U3", "U4", "U5", "U6"].iter().enumerate() {
            history.upsert(&login(id, 60 - i as i64), RoleTag::Student).unwrap();
        }
        let items = history.list(RoleTag::Student).unwrap();
        assert_eq!(ids(&items), vec!["U6", "U5", "U4", "U3", "U2"]);
    }

    #[test]
    fn upsert_refreshes_existing_entry() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        history.upsert(&login("U1", 30), RoleTag::Student).unwrap();
        history.upsert(&login("U2", 20), RoleTag::Student).unwrap();
        history
            .upsert(&Login::new("U1", "new-pw"), RoleTag::Student)
            .unwrap();

        let items = history.list(RoleTag::Student).unwrap();
        assert_eq!(ids(&items), vec!["U1", "U2"]);
        assert_eq!(items[0].secret.expose_secret(), "new-pw");
    }

    #[test]
    fn older_login_sorts_behind_newer_entries() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        history.upsert(&login("NEW", 1), RoleTag::Student).unwrap();
        history.upsert(&login("OLD", 90), RoleTag::Student).unwrap();
        let items = history.list(RoleTag::Student).unwrap();
        assert_eq!(ids(&items), vec!["NEW", "OLD"]);
    }

    #[test]
    fn roles_are_partitioned() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        history.upsert(&login("S1", 1), RoleTag::Student).unwrap();
        history.upsert(&login("T1", 1), RoleTag::Teacher).unwrap();
        assert_eq!(ids(&history.list(RoleTag::Student).unwrap()), vec!["S1"]);
        assert_eq!(ids(&history.list(RoleTag::Teacher).unwrap()), vec!["T1"]);
        assert!(history.list(RoleTag::Admin).unwrap().is_empty());
    }

    #[test]
    fn undecodable_entries_are_compacted() {
        let (store, history) = history(DEFAULT_MAX_HISTORY);
        history.upsert(&login("GOOD", 1), RoleTag::Student).unwrap();
        let mut entries = history.raw_entries(RoleTag::Student).unwrap();
        entries.push(HistoryEntry {
            identifier: "BAD".into(),
            encoded_secret: "CSMU_ENC_V2:!!!".into(),
            role: RoleTag::Student,
            last_access_at: Utc::now() - Duration::hours(1),
            display_label: "BAD".into(),
        });
        history.replace_entries(RoleTag::Student, &entries).unwrap();

        assert_eq!(ids(&history.list(RoleTag::Student).unwrap()), vec!["GOOD"]);
        let raw = store.get(&history_key(RoleTag::Student)).unwrap().unwrap();
        assert!(!raw.contains("BAD"));
    }

    #[test]
    fn legacy_entries_still_list() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        let entries = vec![HistoryEntry {
            identifier: "U1".into(),
            encoded_secret: legacy_v1_payload("old-pw"),
            role: RoleTag::Student,
            last_access_at: Utc::now(),
            display_label: "U1".into(),
        }];
        history.replace_entries(RoleTag::Student, &entries).unwrap();
        let items = history.list(RoleTag::Student).unwrap();
        assert_eq!(items[0].secret.expose_secret(), "old-pw");
    }

    #[test]
    fn malformed_collection_reads_as_empty() {
        let (store, history) = history(DEFAULT_MAX_HISTORY);
        store.set(&history_key(RoleTag::Admin), "[{oops").unwrap();
        assert!(history.list(RoleTag::Admin).unwrap().is_empty());
        assert!(store.get(&history_key(RoleTag::Admin)).unwrap().is_none());
    }

    #[test]
    fn remove_and_clear() {
        let (store, history) = history(DEFAULT_MAX_HISTORY);
        history.upsert(&login("U1", 2), RoleTag::Student).unwrap();
        history.upsert(&login("U2", 1), RoleTag::Student).unwrap();
        history.remove("U1", RoleTag::Student).unwrap();
        assert_eq!(ids(&history.list(RoleTag::Student).unwrap()), vec!["U2"]);

        history.remove("missing", RoleTag::Student).unwrap();
        history.clear(RoleTag::Student).unwrap();
        assert!(store.get(&history_key(RoleTag::Student)).unwrap().is_none());
    }

    #[test]
    fn prune_drops_only_expired_entries() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        let now = Utc::now();
        history
            .upsert(&Login::new("FRESH", "pw").at(now - Duration::days(2)), RoleTag::Student)
            .unwrap();
        history
            .upsert(&Login::new("STALE", "pw").at(now - Duration::days(45)), RoleTag::Student)
            .unwrap();
        history
            .upsert(&Login::new("T-STALE", "pw").at(now - Duration::days(31)), RoleTag::Teacher)
            .unwrap();

        let pruned = history.prune_expired_at(now, Duration::days(30)).unwrap();
        assert_eq!(pruned, 2);
        assert_eq!(ids(&history.list(RoleTag::Student).unwrap()), vec!["FRESH"]);
        assert!(history.list(RoleTag::Teacher).unwrap().is_empty());
        assert_eq!(history.prune_expired_at(now, Duration::days(30)).unwrap(), 0);
    }

    #[test]
    fn huge_expiry_window_expires_nothing() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        history
            .upsert(&Login::new("OLD", "pw").at(Utc::now() - Duration::days(400)), RoleTag::Student)
            .unwrap();

        assert_eq!(history.prune_expired(u32::MAX).unwrap(), 0);
        assert_eq!(
            history.prune_expired_at(Utc::now(), Duration::MAX).unwrap(),
            0
        );
        assert_eq!(ids(&history.list(RoleTag::Student).unwrap()), vec!["OLD"]);
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let (_store, history) = history(DEFAULT_MAX_HISTORY);
        let err = history.upsert(&Login::new("", "pw"), RoleTag::Student).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        let err = history.upsert(&Login::new("U1", ""), RoleTag::Student).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[test]
    fn stage_keeps_timestamps_and_bound() {
        let (_store, history) = history(2);
        let items: Vec<HistoryItem> = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, id)| HistoryItem {
                identifier: id.to_string(),
                secret: SecretString::from("pw".to_string()),
                role: RoleTag::Admin,
                last_access_at: Utc::now() - Duration::minutes(i as i64),
                display_label: id.to_string(),
            })
            .collect();
        let mut batch = WriteBatch::new();
        history.stage(RoleTag::Admin, &items, &mut batch).unwrap();
        assert_eq!(batch.len(), 1);
        match &batch.ops()[0] {
            credvault_core::WriteOp::Put { value, .. } => {
                let entries: Vec<HistoryEntry> = serde_json::from_str(value).unwrap();
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].identifier, "A");
                assert_eq!(entries[0].last_access_at, items[0].last_access_at);
            }
            other => panic!("expected put, got {other:?}"),
        }
    }
}
