// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical keys the vault owns inside a backend's store.

use credvault_core::RoleTag;

/// The single remembered-login slot.
pub const CREDENTIAL_SLOT_KEY: &str = "credential.slot";

/// Prefix of the per-role history collections.
pub const HISTORY_KEY_PREFIX: &str = "history.";

/// Reserved key for availability probes. Never holds caller data.
pub const PROBE_KEY: &str = "__credvault_probe__";

/// Key of the history collection for `role`, e.g. `history.student`.
pub fn history_key(role: RoleTag) -> String {
    format!("{HISTORY_KEY_PREFIX}{role}")
}
