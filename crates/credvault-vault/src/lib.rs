// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local credential vault: a single remembered login plus a bounded per-role
//! login history, stored through versioned codecs.
//!
//! # Architecture
//!
//! - [`codec`] - V2 (current), legacy V1 (decode-only) and plain codecs
//! - [`credential::CredentialVault`] - self-healing single-slot store
//! - [`history::HistoryStore`] - bounded, recency-ordered history per role
//! - [`migration::MigrationCoordinator`] - upgrades stale-format data in place
//! - [`backend::Backend`] - a host store paired with a codec chain
//! - [`manager::VaultManager`] - facade over the encrypted and plaintext backends
//!
//! The codecs obfuscate; they are not a cipher. Their job is reversibility and
//! format-version discipline.

pub mod backend;
pub mod codec;
pub mod credential;
pub mod history;
pub mod keys;
pub mod manager;
pub mod migration;
pub mod prompt;

pub use backend::{Backend, BackendCheck};
pub use codec::{Codec, CodecChain, LegacyV1Codec, PlainCodec, V2Codec};
pub use credential::{CredentialVault, StoredCredential};
pub use history::{HistoryStore, display_label};
pub use manager::{AvailabilityReport, IntegrityReport, OpenSummary, StorageStats, VaultManager};
pub use migration::{HistoryMigration, MigrationCoordinator, MigrationOutcome, MigrationReport};
