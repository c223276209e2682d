// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the credvault workspace.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Partition key for the bounded login history collections.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    Student,
    Teacher,
    Admin,
}

impl RoleTag {
    /// Every role, in a stable order.
    pub const ALL: [RoleTag; 3] = [RoleTag::Student, RoleTag::Teacher, RoleTag::Admin];
}

/// Selects which vault backend is active.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Secrets pass through the obfuscating codec chain.
    Encrypted,
    /// Secrets are stored as-is.
    Plaintext,
}

impl BackendKind {
    /// Both backends, encrypted first.
    pub const ALL: [BackendKind; 2] = [BackendKind::Encrypted, BackendKind::Plaintext];

    /// Map the `encryption` configuration flag to a backend.
    pub fn from_encryption_flag(encrypted: bool) -> Self {
        if encrypted {
            Self::Encrypted
        } else {
            Self::Plaintext
        }
    }
}

/// Format version of an encoded secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CodecVersion {
    /// Identity transform used by the plaintext backend.
    Plain,
    /// Legacy untagged shift transform (decode-only).
    V1,
    /// Current tagged substitution transform.
    V2,
}

/// A secret as persisted: the codec version plus the wire payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    pub version: CodecVersion,
    pub payload: String,
}

impl EncodedValue {
    pub fn new(version: CodecVersion, payload: impl Into<String>) -> Self {
        Self {
            version,
            payload: payload.into(),
        }
    }
}

/// The single "remembered login" held by a backend.
///
/// `Debug` output redacts the secret.
#[derive(Debug)]
pub struct CredentialRecord {
    pub identifier: String,
    pub secret: SecretString,
    pub role: RoleTag,
    pub saved_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a record stamped with the current time.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>, role: RoleTag) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::from(secret.into()),
            role,
            saved_at: Utc::now(),
        }
    }

    /// Override the save timestamp.
    pub fn saved_at(mut self, at: DateTime<Utc>) -> Self {
        self.saved_at = at;
        self
    }
}

impl Clone for CredentialRecord {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            secret: SecretString::from(self.secret.expose_secret().to_string()),
            role: self.role,
            saved_at: self.saved_at,
        }
    }
}

/// A successful login, as handed to the history store.
#[derive(Debug)]
pub struct Login {
    pub identifier: String,
    pub secret: SecretString,
    pub at: DateTime<Utc>,
}

impl Login {
    /// Create a login stamped with the current time.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::from(secret.into()),
            at: Utc::now(),
        }
    }

    /// Override the login timestamp.
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// A persisted history entry. The secret is kept in its encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub identifier: String,
    pub encoded_secret: String,
    pub role: RoleTag,
    pub last_access_at: DateTime<Utc>,
    pub display_label: String,
}

/// A decoded history entry, as returned to callers.
#[derive(Debug)]
pub struct HistoryItem {
    pub identifier: String,
    pub secret: SecretString,
    pub role: RoleTag,
    pub last_access_at: DateTime<Utc>,
    pub display_label: String,
}

impl Clone for HistoryItem {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            secret: SecretString::from(self.secret.expose_secret().to_string()),
            role: self.role,
            last_access_at: self.last_access_at,
            display_label: self.display_label.clone(),
        }
    }
}

impl From<HistoryItem> for Login {
    fn from(item: HistoryItem) -> Self {
        Self {
            identifier: item.identifier,
            secret: item.secret,
            at: item.last_access_at,
        }
    }
}
