// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for credvault integration tests.
//!
//! # Components
//!
//! - [`FlakyStore`] - in-memory store that can go offline or fail batch commits
//! - [`fixtures`] - legacy payload encoders and raw persisted-record builders

pub mod fixtures;
pub mod flaky_store;

pub use fixtures::{legacy_v1_payload, stored_credential_json};
pub use flaky_store::FlakyStore;
