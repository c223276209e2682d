// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the credvault credential vault.

use thiserror::Error;

use crate::types::CodecVersion;

/// The error type used across codecs, stores, and the vault facade.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Empty or malformed input to an encode or save operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A payload could not be decoded by the named codec.
    #[error("decode error ({codec}): {reason}")]
    Decode { codec: CodecVersion, reason: String },

    /// No record or entry is stored under the key.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// The host store behind a backend is inaccessible.
    #[error("backend `{backend}` unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// Host store failure (database error, poisoned lock, I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid vault configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Build a [`VaultError::Storage`] from any error or message.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Returns true for [`VaultError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
