// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the host stores behind each vault backend.

pub mod store;

pub use store::{KeyValueStore, WriteBatch, WriteOp};
